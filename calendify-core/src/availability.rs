//! Cross-calendar availability scanning.
//!
//! Decides whether a candidate interval collides with anything a set of
//! group members already holds, across every calendar each member belongs
//! to (their personal calendars and any other group calendars), not just
//! the target calendar.
//!
//! The scan is a plain walk: for each member, every calendar, every event.
//! Cost is linear in the total number of events held by the member set,
//! which the 5-member cap keeps bounded. It performs no writes, so callers
//! may run it speculatively before committing an event. Note that nothing
//! serializes scan-then-commit sequences: two concurrent creates can both
//! scan clean and both commit. Callers needing exclusivity must add their
//! own serialization point (e.g. a version-checked calendar write).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::error::{CoreResult, Error};
use crate::store::EntityStore;
use crate::user::UserId;

/// Strict half-open overlap test: `[s1, e1)` and `[s2, e2)` conflict iff
/// `max(s1, s2) < min(e1, e2)`. An event ending exactly when another
/// starts does not conflict.
pub fn overlaps(
    s1: DateTime<Utc>,
    e1: DateTime<Utc>,
    s2: DateTime<Utc>,
    e2: DateTime<Utc>,
) -> bool {
    s1.max(s2) < e1.min(e2)
}

/// One member's existing commitment that collides with a candidate interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub member_id: UserId,
    pub member_username: String,
    pub event_title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// User-facing rendering: every busy member, their conflicting event and
/// its interval.
pub(crate) fn render_conflicts(conflicts: &[Conflict]) -> String {
    if conflicts.is_empty() {
        return "Scheduling conflict".to_string();
    }
    let details: Vec<String> = conflicts
        .iter()
        .map(|c| {
            format!(
                "{} is busy with '{}' from {} to {}",
                c.member_username,
                c.event_title,
                c.start_time.to_rfc3339_opts(SecondsFormat::Secs, true),
                c.end_time.to_rfc3339_opts(SecondsFormat::Secs, true),
            )
        })
        .collect();
    format!("Scheduling conflict: {}", details.join("; "))
}

/// Find every existing event of `members` that overlaps `[start, end)`.
///
/// `exclude_event_id` is set when re-checking around an existing event so
/// it does not conflict with itself. Members that no longer resolve to a
/// user document are skipped: membership lists are denormalized and the
/// store keeps no referential integrity.
///
/// The result is ordered by member (input order), then by event start and
/// title. Empty means available.
pub async fn check_availability(
    store: &dyn EntityStore,
    members: &[UserId],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude_event_id: Option<&str>,
) -> CoreResult<Vec<Conflict>> {
    if start >= end {
        return Err(Error::InvalidInterval);
    }

    let mut conflicts = Vec::new();
    for member_id in members {
        let Some(member) = store.get_user(member_id).await? else {
            tracing::warn!(%member_id, "skipping dangling member reference in availability scan");
            continue;
        };

        let mut busy = Vec::new();
        for calendar_id in &member.calendar_ids {
            for event in store.events_for_calendar(calendar_id).await? {
                if exclude_event_id.is_some_and(|id| id == event.event_id) {
                    continue;
                }
                if overlaps(event.start_time, event.end_time, start, end) {
                    busy.push(Conflict {
                        member_id: member.user_id.clone(),
                        member_username: member.username.clone(),
                        event_title: event.title.clone(),
                        start_time: event.start_time,
                        end_time: event.end_time,
                    });
                }
            }
        }
        busy.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then_with(|| a.event_title.cmp(&b.event_title))
        });
        conflicts.extend(busy);
    }
    Ok(conflicts)
}
