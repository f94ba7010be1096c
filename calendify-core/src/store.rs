//! Entity store port and the in-memory implementation.
//!
//! The store exposes independent get/put/delete per document plus two
//! secondary-attribute queries (user by username, events by calendar).
//! There are no cross-document transactions and no locks: every
//! referential invariant is enforced by the services before they write.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use thiserror::Error;

use crate::calendar::Calendar;
use crate::event::Event;
use crate::user::User;

/// An unclassified persistence failure.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct StoreError(String);

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        StoreError(message.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Document storage over the three collections: Users, Calendars, Events.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn get_user(&self, user_id: &str) -> StoreResult<Option<User>>;
    async fn put_user(&self, user: &User) -> StoreResult<()>;
    /// Secondary-attribute query; usernames are unique.
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn get_calendar(&self, calendar_id: &str) -> StoreResult<Option<Calendar>>;
    async fn put_calendar(&self, calendar: &Calendar) -> StoreResult<()>;
    /// Deleting an absent calendar is a no-op, which keeps cascade
    /// deletion retryable.
    async fn delete_calendar(&self, calendar_id: &str) -> StoreResult<()>;

    async fn get_event(&self, event_id: &str) -> StoreResult<Option<Event>>;
    async fn put_event(&self, event: &Event) -> StoreResult<()>;
    /// Deleting an absent event is a no-op.
    async fn delete_event(&self, event_id: &str) -> StoreResult<()>;
    /// Secondary-attribute query: every event owned by `calendar_id`,
    /// ordered by start time then id.
    async fn events_for_calendar(&self, calendar_id: &str) -> StoreResult<Vec<Event>>;
}

/// In-memory store, used by tests and as the server's default backend.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    calendars: RwLock<HashMap<String, Calendar>>,
    events: RwLock<HashMap<String, Event>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::new("store lock poisoned")
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get_user(&self, user_id: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.get(user_id).cloned())
    }

    async fn put_user(&self, user: &User) -> StoreResult<()> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        users.insert(user.user_id.clone(), user.clone());
        Ok(())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn get_calendar(&self, calendar_id: &str) -> StoreResult<Option<Calendar>> {
        let calendars = self.calendars.read().map_err(|_| poisoned())?;
        Ok(calendars.get(calendar_id).cloned())
    }

    async fn put_calendar(&self, calendar: &Calendar) -> StoreResult<()> {
        let mut calendars = self.calendars.write().map_err(|_| poisoned())?;
        calendars.insert(calendar.calendar_id.clone(), calendar.clone());
        Ok(())
    }

    async fn delete_calendar(&self, calendar_id: &str) -> StoreResult<()> {
        let mut calendars = self.calendars.write().map_err(|_| poisoned())?;
        calendars.remove(calendar_id);
        Ok(())
    }

    async fn get_event(&self, event_id: &str) -> StoreResult<Option<Event>> {
        let events = self.events.read().map_err(|_| poisoned())?;
        Ok(events.get(event_id).cloned())
    }

    async fn put_event(&self, event: &Event) -> StoreResult<()> {
        let mut events = self.events.write().map_err(|_| poisoned())?;
        events.insert(event.event_id.clone(), event.clone());
        Ok(())
    }

    async fn delete_event(&self, event_id: &str) -> StoreResult<()> {
        let mut events = self.events.write().map_err(|_| poisoned())?;
        events.remove(event_id);
        Ok(())
    }

    async fn events_for_calendar(&self, calendar_id: &str) -> StoreResult<Vec<Event>> {
        let events = self.events.read().map_err(|_| poisoned())?;
        let mut matching: Vec<Event> = events
            .values()
            .filter(|e| e.calendar_id == calendar_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then_with(|| a.event_id.cmp(&b.event_id))
        });
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarColor;
    use crate::event::{Event, EventDraft};
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_events_for_calendar_filters_and_sorts() {
        let store = MemoryStore::new();
        for (id, cal, hour) in [("e2", "cal-1", 12), ("e1", "cal-1", 9), ("e3", "cal-2", 10)] {
            let draft = EventDraft {
                title: id.to_string(),
                start_time: Utc.with_ymd_and_hms(2025, 6, 2, hour, 0, 0).unwrap(),
                end_time: Utc.with_ymd_and_hms(2025, 6, 2, hour + 1, 0, 0).unwrap(),
                description: None,
                locked: None,
            };
            let mut event = Event::from_draft(&draft, cal, "alice", false);
            event.event_id = id.to_string();
            store.put_event(&event).await.expect("Should store event");
        }

        let events = store.events_for_calendar("cal-1").await.expect("Should query");
        let ids: Vec<&str> = events.iter().map(|e| e.event_id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e2"]);
    }

    #[tokio::test]
    async fn test_delete_absent_event_is_noop() {
        let store = MemoryStore::new();
        store.delete_event("nope").await.expect("Should be a no-op");
    }

    #[tokio::test]
    async fn test_find_user_by_username() {
        let store = MemoryStore::new();
        let user = crate::user::User::new("alice-w", "hash", None);
        store.put_user(&user).await.expect("Should store user");

        let found = store
            .find_user_by_username("alice-w")
            .await
            .expect("Should query")
            .expect("Should find alice-w");
        assert_eq!(found.user_id, user.user_id);
        assert!(store
            .find_user_by_username("nobody")
            .await
            .expect("Should query")
            .is_none());
    }

    #[tokio::test]
    async fn test_put_calendar_replaces() {
        let store = MemoryStore::new();
        let mut calendar = crate::calendar::Calendar::personal("alice", "Work", CalendarColor::Blue);
        store.put_calendar(&calendar).await.expect("Should store");

        calendar.name = "Deep Work".to_string();
        store.put_calendar(&calendar).await.expect("Should replace");

        let loaded = store
            .get_calendar(&calendar.calendar_id)
            .await
            .expect("Should query")
            .expect("Should exist");
        assert_eq!(loaded.name, "Deep Work");
    }
}
