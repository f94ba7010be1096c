//! Event documents and their create/update payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::CalendarId;
use crate::error::{CoreResult, Error};
use crate::user::UserId;

pub type EventId = String;

/// An event, owned by exactly one calendar.
///
/// Mutation is restricted to `creator_id`, which is independent of the
/// owning calendar's `owner_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_id: EventId,
    pub calendar_id: CalendarId,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub locked: bool,
    pub description: Option<String>,
    pub creator_id: UserId,
}

/// Caller-supplied fields for a new event. The owning calendar and the
/// creator are never taken from the draft; the service fixes both.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub description: Option<String>,
    pub locked: Option<bool>,
}

impl EventDraft {
    pub fn validate(&self) -> CoreResult<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("Event title must not be empty".to_string()));
        }
        if self.start_time >= self.end_time {
            return Err(Error::Validation(
                "Event start time must be before its end time".to_string(),
            ));
        }
        Ok(())
    }
}

/// Allow-listed mutable event fields. `event_id`, `calendar_id` and
/// `creator_id` are immutable; unknown fields are a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EventPatch {
    pub title: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub locked: Option<bool>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.description.is_none()
            && self.locked.is_none()
    }
}

impl Event {
    /// Build an event from a validated draft, pinned to `calendar_id` and
    /// `creator_id` regardless of what the caller sent.
    pub fn from_draft(draft: &EventDraft, calendar_id: &str, creator_id: &str, locked: bool) -> Self {
        Event {
            event_id: Uuid::new_v4().to_string(),
            calendar_id: calendar_id.to_string(),
            title: draft.title.clone(),
            start_time: draft.start_time,
            end_time: draft.end_time,
            locked,
            description: draft.description.clone(),
            creator_id: creator_id.to_string(),
        }
    }

    /// Apply the allow-listed fields of `patch`, then re-check that the
    /// resulting interval is still well-formed.
    pub fn apply_patch(&mut self, patch: &EventPatch) -> CoreResult<()> {
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(Error::Validation("Event title must not be empty".to_string()));
            }
            self.title = title.clone();
        }
        if let Some(start) = patch.start_time {
            self.start_time = start;
        }
        if let Some(end) = patch.end_time {
            self.end_time = end;
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(locked) = patch.locked {
            self.locked = locked;
        }
        if self.start_time >= self.end_time {
            return Err(Error::Validation(
                "Event start time must be before its end time".to_string(),
            ));
        }
        Ok(())
    }
}
