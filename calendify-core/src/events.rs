//! Event lifecycle: create, update, delete, list.

use std::sync::Arc;

use crate::availability::check_availability;
use crate::calendar::Calendar;
use crate::error::{CoreResult, Error};
use crate::event::{Event, EventDraft, EventPatch};
use crate::notify::{event_scheduled_message, Notifier};
use crate::store::EntityStore;

pub struct EventService {
    store: Arc<dyn EntityStore>,
    notifier: Arc<dyn Notifier>,
}

impl EventService {
    pub fn new(store: Arc<dyn EntityStore>, notifier: Arc<dyn Notifier>) -> Self {
        EventService { store, notifier }
    }

    /// Create an event on `calendar_id` as `actor_id`.
    ///
    /// For group calendars the availability of every member is scanned
    /// first; any overlap rejects the whole attempt with the full conflict
    /// list. The scan and the write are not serialized against concurrent
    /// creators (see [`check_availability`]).
    pub async fn create_event(
        &self,
        calendar_id: &str,
        actor_id: &str,
        draft: EventDraft,
    ) -> CoreResult<Event> {
        let calendar = self.load_calendar(calendar_id).await?;
        self.require_member(&calendar, actor_id)?;
        draft.validate()?;

        if calendar.is_group {
            let conflicts = check_availability(
                self.store.as_ref(),
                &calendar.members,
                draft.start_time,
                draft.end_time,
                None,
            )
            .await?;
            if !conflicts.is_empty() {
                tracing::info!(
                    calendar_id,
                    conflicts = conflicts.len(),
                    "group event rejected: members busy"
                );
                return Err(Error::SchedulingConflict(conflicts));
            }
        }

        // Personal-calendar events are locked by default; the calendar and
        // creator always come from the validated context, never the draft.
        let locked = draft.locked.unwrap_or(!calendar.is_group);
        let event = Event::from_draft(&draft, &calendar.calendar_id, actor_id, locked);
        self.store.put_event(&event).await?;
        tracing::info!(event_id = %event.event_id, calendar_id, "event created");

        if calendar.is_group {
            // Best effort only: the event is already committed and a failed
            // notification must not unwind it.
            self.notify_members(&calendar, &event).await;
        }
        Ok(event)
    }

    /// Update an event. Only its creator may do so, and only the
    /// allow-listed fields move. The availability scan is deliberately not
    /// re-run here; a rescheduling update can introduce a conflict that
    /// creation would have rejected.
    pub async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        actor_id: &str,
        patch: EventPatch,
    ) -> CoreResult<Event> {
        let mut event = self.load_event(calendar_id, event_id).await?;
        self.require_creator(&event, actor_id)?;
        if patch.is_empty() {
            return Err(Error::Validation("No fields to update".to_string()));
        }

        event.apply_patch(&patch)?;
        self.store.put_event(&event).await?;
        tracing::info!(event_id, calendar_id, "event updated");
        Ok(event)
    }

    /// Delete an event. Creator-only; permanent once authorized.
    pub async fn delete_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        actor_id: &str,
    ) -> CoreResult<()> {
        let event = self.load_event(calendar_id, event_id).await?;
        self.require_creator(&event, actor_id)?;
        self.store.delete_event(event_id).await?;
        tracing::info!(event_id, calendar_id, "event deleted");
        Ok(())
    }

    /// List a calendar's events; members only.
    pub async fn list_events(&self, calendar_id: &str, actor_id: &str) -> CoreResult<Vec<Event>> {
        let calendar = self.load_calendar(calendar_id).await?;
        self.require_member(&calendar, actor_id)?;
        Ok(self.store.events_for_calendar(calendar_id).await?)
    }

    async fn load_calendar(&self, calendar_id: &str) -> CoreResult<Calendar> {
        self.store
            .get_calendar(calendar_id)
            .await?
            .ok_or_else(|| Error::CalendarNotFound(calendar_id.to_string()))
    }

    /// Events live in a per-calendar partition: an id that exists under a
    /// different calendar is not found here.
    async fn load_event(&self, calendar_id: &str, event_id: &str) -> CoreResult<Event> {
        self.store
            .get_event(event_id)
            .await?
            .filter(|e| e.calendar_id == calendar_id)
            .ok_or_else(|| Error::EventNotFound(event_id.to_string()))
    }

    fn require_member(&self, calendar: &Calendar, actor_id: &str) -> CoreResult<()> {
        if !calendar.is_member(actor_id) {
            return Err(Error::NotAMember {
                user_id: actor_id.to_string(),
                calendar_id: calendar.calendar_id.clone(),
            });
        }
        Ok(())
    }

    fn require_creator(&self, event: &Event, actor_id: &str) -> CoreResult<()> {
        if event.creator_id != actor_id {
            return Err(Error::Forbidden(
                "Only the event creator can modify the event".to_string(),
            ));
        }
        Ok(())
    }

    async fn notify_members(&self, calendar: &Calendar, event: &Event) {
        for member_id in &calendar.members {
            let member = match self.store.get_user(member_id).await {
                Ok(Some(member)) => member,
                Ok(None) => continue,
                Err(err) => {
                    tracing::warn!(%member_id, %err, "skipping notification: member lookup failed");
                    continue;
                }
            };
            let Some(email) = &member.email else { continue };
            let (subject, body) = event_scheduled_message(&member.username, &calendar.name, event);
            if !self.notifier.notify(email, &subject, &body).await {
                tracing::warn!(%member_id, "event notification failed");
            }
        }
    }
}
