//! Calendar lifecycle: creation, membership, editing, leaving, deletion.

use std::sync::Arc;

use crate::calendar::{Calendar, CalendarColor, CalendarPatch};
use crate::error::{CoreResult, Error};
use crate::notify::{group_invite_message, Notifier};
use crate::rules::{self, AddMemberCheck};
use crate::store::EntityStore;
use crate::user::User;

/// Result of an add-member request. Adding a present member succeeds
/// without touching the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddMemberOutcome {
    Added,
    AlreadyMember,
}

/// Result of a remove-member request; removing an absent member is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveMemberOutcome {
    Removed,
    NotAMember,
}

pub struct CalendarService {
    store: Arc<dyn EntityStore>,
    notifier: Arc<dyn Notifier>,
}

impl CalendarService {
    pub fn new(store: Arc<dyn EntityStore>, notifier: Arc<dyn Notifier>) -> Self {
        CalendarService { store, notifier }
    }

    pub async fn create_personal_calendar(
        &self,
        user_id: &str,
        name: &str,
        color: CalendarColor,
    ) -> CoreResult<Calendar> {
        let mut user = self.load_user(user_id).await?;
        validate_name(name)?;

        let calendar = Calendar::personal(user_id, name, color);
        self.store.put_calendar(&calendar).await?;
        user.link_calendar(&calendar.calendar_id);
        self.store.put_user(&user).await?;
        tracing::info!(calendar_id = %calendar.calendar_id, user_id, "personal calendar created");
        Ok(calendar)
    }

    /// Create a group calendar. `member_usernames` are resolved to accounts
    /// up front; any unknown name rejects the whole request. The owner is
    /// always a member whether or not their name was listed.
    pub async fn create_group_calendar(
        &self,
        owner_id: &str,
        name: &str,
        member_usernames: &[String],
        color: CalendarColor,
    ) -> CoreResult<Calendar> {
        let mut owner = self.load_user(owner_id).await?;
        validate_name(name)?;

        let mut members = Vec::new();
        let mut invited = Vec::new();
        for username in member_usernames {
            let user = self
                .store
                .find_user_by_username(username)
                .await?
                .ok_or_else(|| Error::MemberNotFound(username.clone()))?;
            if user.user_id != owner.user_id && !members.contains(&user.user_id) {
                members.push(user.user_id.clone());
                invited.push(user);
            }
        }

        let calendar = Calendar::group(owner_id, name, &members, color);
        if calendar.members.len() > crate::calendar::GROUP_MEMBER_CAP {
            return Err(Error::CapacityExceeded { cap: crate::calendar::GROUP_MEMBER_CAP });
        }
        self.store.put_calendar(&calendar).await?;
        tracing::info!(calendar_id = %calendar.calendar_id, owner_id, members = calendar.members.len(), "group calendar created");

        owner.link_calendar(&calendar.calendar_id);
        self.store.put_user(&owner).await?;
        for mut member in invited {
            member.link_calendar(&calendar.calendar_id);
            self.store.put_user(&member).await?;
            self.send_invite(&member, &calendar).await;
        }
        Ok(calendar)
    }

    /// Add a user to a group calendar. Owner-only; idempotent.
    pub async fn add_member(
        &self,
        calendar_id: &str,
        actor_id: &str,
        member_id: &str,
    ) -> CoreResult<AddMemberOutcome> {
        let mut calendar = self.load_group(calendar_id).await?;
        rules::can_mutate_group(&calendar, actor_id)?;
        let mut member = self.load_user(member_id).await?;

        match rules::can_add_member(&calendar, member_id)? {
            AddMemberCheck::AlreadyMember => Ok(AddMemberOutcome::AlreadyMember),
            AddMemberCheck::Admissible => {
                calendar.members.push(member_id.to_string());
                self.store.put_calendar(&calendar).await?;
                member.link_calendar(calendar_id);
                self.store.put_user(&member).await?;
                self.send_invite(&member, &calendar).await;
                tracing::info!(calendar_id, member_id, "member added");
                Ok(AddMemberOutcome::Added)
            }
        }
    }

    /// Remove a user from a group calendar. Owner-only; idempotent. The
    /// owner cannot be removed this way: leaving is the only exit that
    /// keeps the ownership invariant intact.
    pub async fn remove_member(
        &self,
        calendar_id: &str,
        actor_id: &str,
        member_id: &str,
    ) -> CoreResult<RemoveMemberOutcome> {
        let mut calendar = self.load_group(calendar_id).await?;
        rules::can_mutate_group(&calendar, actor_id)?;

        if !calendar.is_member(member_id) {
            return Ok(RemoveMemberOutcome::NotAMember);
        }
        if calendar.is_owner(member_id) {
            return Err(Error::Validation(
                "The owner cannot be removed; leave the calendar instead".to_string(),
            ));
        }

        calendar.members.retain(|id| id != member_id);
        self.store.put_calendar(&calendar).await?;
        self.unlink_user(member_id, calendar_id).await?;
        tracing::info!(calendar_id, member_id, "member removed");
        Ok(RemoveMemberOutcome::Removed)
    }

    /// Rename or recolor a calendar. Owner-only.
    pub async fn edit_calendar(
        &self,
        calendar_id: &str,
        actor_id: &str,
        patch: CalendarPatch,
    ) -> CoreResult<Calendar> {
        let mut calendar = self.load_calendar(calendar_id).await?;
        rules::can_mutate_group(&calendar, actor_id)?;
        if patch.is_empty() {
            return Err(Error::Validation("No fields to update".to_string()));
        }

        if let Some(name) = &patch.name {
            validate_name(name)?;
            calendar.name = name.clone();
        }
        if let Some(color) = patch.color {
            calendar.color = color;
        }
        self.store.put_calendar(&calendar).await?;
        tracing::info!(calendar_id, "calendar edited");
        Ok(calendar)
    }

    /// Leave a group calendar.
    ///
    /// When the owner leaves, ownership passes to the first remaining
    /// member in `members` order. This is deterministic and depends on
    /// insertion order. A sole-member owner cannot leave; they must delete
    /// the calendar instead.
    pub async fn leave_group_calendar(&self, calendar_id: &str, user_id: &str) -> CoreResult<()> {
        let mut calendar = self.load_group(calendar_id).await?;
        if !calendar.is_member(user_id) {
            return Err(Error::NotAMember {
                user_id: user_id.to_string(),
                calendar_id: calendar_id.to_string(),
            });
        }

        if calendar.is_owner(user_id) {
            if calendar.members.len() == 1 {
                return Err(Error::SoleMemberCannotLeave);
            }
            calendar.members.retain(|id| id != user_id);
            calendar.owner_id = calendar.members[0].clone();
            tracing::info!(calendar_id, new_owner = %calendar.owner_id, "ownership transferred");
        } else {
            calendar.members.retain(|id| id != user_id);
        }

        self.store.put_calendar(&calendar).await?;
        self.unlink_user(user_id, calendar_id).await?;
        tracing::info!(calendar_id, user_id, "member left");
        Ok(())
    }

    /// Delete a personal calendar and every event on it. The default
    /// calendar is never deletable.
    pub async fn delete_personal_calendar(&self, calendar_id: &str, actor_id: &str) -> CoreResult<()> {
        let calendar = self.load_calendar(calendar_id).await?;
        if calendar.is_group {
            return Err(Error::Validation("Not a personal calendar".to_string()));
        }
        rules::can_delete_calendar(&calendar, actor_id)?;
        self.cascade_delete(&calendar).await
    }

    /// Delete a group calendar and every event on it. Owner-only.
    pub async fn delete_group_calendar(&self, calendar_id: &str, actor_id: &str) -> CoreResult<()> {
        let calendar = self.load_group(calendar_id).await?;
        rules::can_delete_calendar(&calendar, actor_id)?;
        self.cascade_delete(&calendar).await
    }

    /// Every calendar the user belongs to. Dangling ids (a concurrent
    /// delete between the two reads) are skipped.
    pub async fn list_calendars(&self, user_id: &str) -> CoreResult<Vec<Calendar>> {
        let user = self.load_user(user_id).await?;
        let mut calendars = Vec::new();
        for calendar_id in &user.calendar_ids {
            if let Some(calendar) = self.store.get_calendar(calendar_id).await? {
                calendars.push(calendar);
            }
        }
        Ok(calendars)
    }

    /// Events first, calendar last. A partial failure leaves the calendar
    /// document in place so the caller can retry; event deletion is
    /// idempotent, so the retry simply re-scans whatever is left.
    async fn cascade_delete(&self, calendar: &Calendar) -> CoreResult<()> {
        let events = self.store.events_for_calendar(&calendar.calendar_id).await?;
        for event in &events {
            self.store.delete_event(&event.event_id).await?;
        }
        self.store.delete_calendar(&calendar.calendar_id).await?;

        for member_id in &calendar.members {
            self.unlink_user(member_id, &calendar.calendar_id).await?;
        }
        tracing::info!(
            calendar_id = %calendar.calendar_id,
            events = events.len(),
            "calendar deleted with cascade"
        );
        Ok(())
    }

    async fn unlink_user(&self, user_id: &str, calendar_id: &str) -> CoreResult<()> {
        if let Some(mut user) = self.store.get_user(user_id).await? {
            user.unlink_calendar(calendar_id);
            self.store.put_user(&user).await?;
        }
        Ok(())
    }

    async fn send_invite(&self, member: &User, calendar: &Calendar) {
        let Some(email) = &member.email else { return };
        let (subject, body) = group_invite_message(&member.username, &calendar.name);
        if !self.notifier.notify(email, &subject, &body).await {
            tracing::warn!(member_id = %member.user_id, "invite notification failed");
        }
    }

    async fn load_user(&self, user_id: &str) -> CoreResult<User> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))
    }

    async fn load_calendar(&self, calendar_id: &str) -> CoreResult<Calendar> {
        self.store
            .get_calendar(calendar_id)
            .await?
            .ok_or_else(|| Error::CalendarNotFound(calendar_id.to_string()))
    }

    async fn load_group(&self, calendar_id: &str) -> CoreResult<Calendar> {
        let calendar = self.load_calendar(calendar_id).await?;
        if !calendar.is_group {
            return Err(Error::Validation("Not a group calendar".to_string()));
        }
        Ok(calendar)
    }
}

fn validate_name(name: &str) -> CoreResult<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation("Calendar name must not be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::LogNotifier;
    use crate::store::MemoryStore;
    use crate::testutil::{at, seed_event, seed_user};

    fn service(store: Arc<MemoryStore>) -> CalendarService {
        CalendarService::new(store, Arc::new(LogNotifier))
    }

    #[tokio::test]
    async fn test_create_group_resolves_usernames() {
        let store = Arc::new(MemoryStore::new());
        let calendars = service(store.clone());
        let owner = seed_user(&store, "owner-person").await;
        let bob = seed_user(&store, "bob-builder").await;

        let calendar = calendars
            .create_group_calendar(
                &owner.user_id,
                "Team",
                &["bob-builder".to_string()],
                CalendarColor::Blue,
            )
            .await
            .expect("Should create group");
        assert_eq!(calendar.members, vec![owner.user_id.clone(), bob.user_id.clone()]);

        // Both users now carry the calendar link.
        let bob = store.get_user(&bob.user_id).await.unwrap().unwrap();
        assert!(bob.calendar_ids.contains(&calendar.calendar_id));

        let result = calendars
            .create_group_calendar(
                &owner.user_id,
                "Team 2",
                &["nobody-here".to_string()],
                CalendarColor::Blue,
            )
            .await;
        assert!(matches!(result, Err(Error::MemberNotFound(_))));
    }

    #[tokio::test]
    async fn test_create_group_enforces_cap() {
        let store = Arc::new(MemoryStore::new());
        let calendars = service(store.clone());
        let owner = seed_user(&store, "owner-person").await;

        let mut usernames = Vec::new();
        for i in 0..4 {
            let username = format!("user-{:02}-name", i);
            seed_user(&store, &username).await;
            usernames.push(username);
        }

        // Owner + 4 = 5: at the cap.
        calendars
            .create_group_calendar(&owner.user_id, "Full", &usernames, CalendarColor::Red)
            .await
            .expect("Five members should be admitted");

        let extra = "user-05-name".to_string();
        seed_user(&store, &extra).await;
        usernames.push(extra);
        let result = calendars
            .create_group_calendar(&owner.user_id, "Over", &usernames, CalendarColor::Red)
            .await;
        assert!(matches!(result, Err(Error::CapacityExceeded { .. })));
    }

    #[tokio::test]
    async fn test_add_member_is_owner_gated_and_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let calendars = service(store.clone());
        let owner = seed_user(&store, "owner-person").await;
        let bob = seed_user(&store, "bob-builder").await;
        let carol = seed_user(&store, "carol-jones").await;

        let calendar = calendars
            .create_group_calendar(&owner.user_id, "Team", &[], CalendarColor::Blue)
            .await
            .expect("Should create group");

        // Non-owner cannot add.
        let result = calendars
            .add_member(&calendar.calendar_id, &bob.user_id, &carol.user_id)
            .await;
        assert!(matches!(result, Err(Error::Forbidden(_))));

        let outcome = calendars
            .add_member(&calendar.calendar_id, &owner.user_id, &bob.user_id)
            .await
            .expect("Owner should add");
        assert_eq!(outcome, AddMemberOutcome::Added);

        let outcome = calendars
            .add_member(&calendar.calendar_id, &owner.user_id, &bob.user_id)
            .await
            .expect("Re-adding should be a no-op");
        assert_eq!(outcome, AddMemberOutcome::AlreadyMember);

        let loaded = store.get_calendar(&calendar.calendar_id).await.unwrap().unwrap();
        assert_eq!(loaded.members.len(), 2);
    }

    #[tokio::test]
    async fn test_remove_member_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let calendars = service(store.clone());
        let owner = seed_user(&store, "owner-person").await;
        let bob = seed_user(&store, "bob-builder").await;

        let calendar = calendars
            .create_group_calendar(&owner.user_id, "Team", &["bob-builder".to_string()], CalendarColor::Blue)
            .await
            .expect("Should create group");

        let outcome = calendars
            .remove_member(&calendar.calendar_id, &owner.user_id, &bob.user_id)
            .await
            .expect("Owner should remove");
        assert_eq!(outcome, RemoveMemberOutcome::Removed);

        // Bob's link is gone too.
        let bob_doc = store.get_user(&bob.user_id).await.unwrap().unwrap();
        assert!(!bob_doc.calendar_ids.contains(&calendar.calendar_id));

        let outcome = calendars
            .remove_member(&calendar.calendar_id, &owner.user_id, &bob.user_id)
            .await
            .expect("Removing a non-member should be a no-op");
        assert_eq!(outcome, RemoveMemberOutcome::NotAMember);
    }

    #[tokio::test]
    async fn test_owner_cannot_be_removed() {
        let store = Arc::new(MemoryStore::new());
        let calendars = service(store.clone());
        let owner = seed_user(&store, "owner-person").await;

        let calendar = calendars
            .create_group_calendar(&owner.user_id, "Team", &[], CalendarColor::Blue)
            .await
            .expect("Should create group");

        let result = calendars
            .remove_member(&calendar.calendar_id, &owner.user_id, &owner.user_id)
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_ownership_transfer_is_deterministic() {
        let store = Arc::new(MemoryStore::new());
        let calendars = service(store.clone());
        let owner = seed_user(&store, "owner-person").await;
        let b = seed_user(&store, "member-bbbbb").await;
        let c = seed_user(&store, "member-ccccc").await;

        let calendar = calendars
            .create_group_calendar(
                &owner.user_id,
                "Team",
                &["member-bbbbb".to_string(), "member-ccccc".to_string()],
                CalendarColor::Blue,
            )
            .await
            .expect("Should create group");

        calendars
            .leave_group_calendar(&calendar.calendar_id, &owner.user_id)
            .await
            .expect("Owner should leave");

        // members were [owner, b, c]; the first remaining member wins.
        let loaded = store.get_calendar(&calendar.calendar_id).await.unwrap().unwrap();
        assert_eq!(loaded.owner_id, b.user_id);
        assert_eq!(loaded.members, vec![b.user_id.clone(), c.user_id.clone()]);

        let owner_doc = store.get_user(&owner.user_id).await.unwrap().unwrap();
        assert!(!owner_doc.calendar_ids.contains(&calendar.calendar_id));
    }

    #[tokio::test]
    async fn test_sole_member_cannot_leave() {
        let store = Arc::new(MemoryStore::new());
        let calendars = service(store.clone());
        let owner = seed_user(&store, "owner-person").await;

        let calendar = calendars
            .create_group_calendar(&owner.user_id, "Team", &[], CalendarColor::Blue)
            .await
            .expect("Should create group");

        let result = calendars
            .leave_group_calendar(&calendar.calendar_id, &owner.user_id)
            .await;
        assert!(matches!(result, Err(Error::SoleMemberCannotLeave)));
    }

    #[tokio::test]
    async fn test_leave_requires_membership() {
        let store = Arc::new(MemoryStore::new());
        let calendars = service(store.clone());
        let owner = seed_user(&store, "owner-person").await;
        let stranger = seed_user(&store, "mallory-x").await;

        let calendar = calendars
            .create_group_calendar(&owner.user_id, "Team", &[], CalendarColor::Blue)
            .await
            .expect("Should create group");

        let result = calendars
            .leave_group_calendar(&calendar.calendar_id, &stranger.user_id)
            .await;
        assert!(matches!(result, Err(Error::NotAMember { .. })));
    }

    #[tokio::test]
    async fn test_cascade_delete_removes_all_events() {
        let store = Arc::new(MemoryStore::new());
        let calendars = service(store.clone());
        let owner = seed_user(&store, "owner-person").await;

        let calendar = calendars
            .create_personal_calendar(&owner.user_id, "Work", CalendarColor::Yellow)
            .await
            .expect("Should create");
        for hour in [9, 11, 14] {
            seed_event(&store, &calendar.calendar_id, &owner.user_id, "E", at(hour, 0), at(hour + 1, 0)).await;
        }

        calendars
            .delete_personal_calendar(&calendar.calendar_id, &owner.user_id)
            .await
            .expect("Should delete");

        assert!(store.get_calendar(&calendar.calendar_id).await.unwrap().is_none());
        assert!(store
            .events_for_calendar(&calendar.calendar_id)
            .await
            .unwrap()
            .is_empty());
        let owner_doc = store.get_user(&owner.user_id).await.unwrap().unwrap();
        assert!(!owner_doc.calendar_ids.contains(&calendar.calendar_id));

        // A second delete finds nothing and has no side effects.
        let result = calendars
            .delete_personal_calendar(&calendar.calendar_id, &owner.user_id)
            .await;
        assert!(matches!(result, Err(Error::CalendarNotFound(_))));
    }

    #[tokio::test]
    async fn test_default_calendar_not_deletable() {
        let store = Arc::new(MemoryStore::new());
        let calendars = service(store.clone());
        let owner = seed_user(&store, "owner-person").await;
        let default_id = owner.default_calendar_id.clone().expect("Seeded with default");

        let result = calendars.delete_personal_calendar(&default_id, &owner.user_id).await;
        assert!(matches!(result, Err(Error::DefaultProtected)));
    }

    #[tokio::test]
    async fn test_delete_group_calendar_owner_only() {
        let store = Arc::new(MemoryStore::new());
        let calendars = service(store.clone());
        let owner = seed_user(&store, "owner-person").await;
        let bob = seed_user(&store, "bob-builder").await;

        let calendar = calendars
            .create_group_calendar(&owner.user_id, "Team", &["bob-builder".to_string()], CalendarColor::Blue)
            .await
            .expect("Should create group");

        let result = calendars
            .delete_group_calendar(&calendar.calendar_id, &bob.user_id)
            .await;
        assert!(matches!(result, Err(Error::Forbidden(_))));

        calendars
            .delete_group_calendar(&calendar.calendar_id, &owner.user_id)
            .await
            .expect("Owner should delete");
        assert!(store.get_calendar(&calendar.calendar_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_edit_calendar() {
        let store = Arc::new(MemoryStore::new());
        let calendars = service(store.clone());
        let owner = seed_user(&store, "owner-person").await;

        let calendar = calendars
            .create_personal_calendar(&owner.user_id, "Work", CalendarColor::Blue)
            .await
            .expect("Should create");

        let result = calendars
            .edit_calendar(&calendar.calendar_id, &owner.user_id, CalendarPatch::default())
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));

        let patch = CalendarPatch {
            name: Some("Deep work".to_string()),
            color: Some(CalendarColor::Purple),
        };
        let edited = calendars
            .edit_calendar(&calendar.calendar_id, &owner.user_id, patch)
            .await
            .expect("Owner should edit");
        assert_eq!(edited.name, "Deep work");
        assert_eq!(edited.color, CalendarColor::Purple);
    }

    #[tokio::test]
    async fn test_list_calendars_skips_dangling_links() {
        let store = Arc::new(MemoryStore::new());
        let calendars = service(store.clone());
        let mut owner = seed_user(&store, "owner-person").await;

        owner.link_calendar("gone-calendar");
        store.put_user(&owner).await.unwrap();

        let listed = calendars.list_calendars(&owner.user_id).await.expect("Should list");
        assert_eq!(listed.len(), 1, "only the default calendar resolves");
    }
}
