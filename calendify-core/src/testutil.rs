//! Shared fixtures for service tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::calendar::Calendar;
use crate::event::{Event, EventDraft};
use crate::store::{EntityStore, MemoryStore};
use crate::user::User;

/// A timestamp on the fixed test day (2025-06-02, UTC).
pub fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, hour, min, 0).unwrap()
}

/// A registered user with their default calendar in place.
pub async fn seed_user(store: &MemoryStore, username: &str) -> User {
    let mut user = User::new(username, "hash", Some(format!("{}@example.com", username)));
    let calendar = Calendar::default_for(&user.user_id, username);
    user.default_calendar_id = Some(calendar.calendar_id.clone());
    user.calendar_ids.push(calendar.calendar_id.clone());
    store.put_calendar(&calendar).await.unwrap();
    store.put_user(&user).await.unwrap();
    user
}

pub fn draft(title: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> EventDraft {
    EventDraft {
        title: title.to_string(),
        start_time: start,
        end_time: end,
        description: None,
        locked: None,
    }
}

pub async fn seed_event(
    store: &MemoryStore,
    calendar_id: &str,
    creator_id: &str,
    title: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Event {
    let event = Event::from_draft(&draft(title, start, end), calendar_id, creator_id, false);
    store.put_event(&event).await.unwrap();
    event
}
