//! Notification port and message builders.
//!
//! Delivery is an external collaborator: the engine only knows how to hand
//! a recipient, a subject and a body to a [`Notifier`]. Every call is
//! fire-and-forget; a failed send is logged by the caller and never turns
//! into an operation failure.

use async_trait::async_trait;

use crate::event::Event;

/// Fire-and-forget delivery of a single message. Returns whether the send
/// was accepted.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, to: &str, subject: &str, body: &str) -> bool;
}

/// Logs every message instead of delivering it. Default backend for the
/// server and for tests.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, to: &str, subject: &str, body: &str) -> bool {
        tracing::info!(to, subject, body, "notification");
        true
    }
}

pub fn welcome_message(username: &str) -> (String, String) {
    (
        "Welcome to Calendify!".to_string(),
        format!(
            "Hello {},\n\nThank you for signing up for Calendify! \
             Create personal calendars to organize your events, or invite \
             others to group calendars for collaborative scheduling.\n\n\
             Happy planning!",
            username
        ),
    )
}

pub fn group_invite_message(username: &str, calendar_name: &str) -> (String, String) {
    (
        format!("You were added to '{}'", calendar_name),
        format!(
            "Hello {},\n\nYou are now a member of the group calendar \
             '{}'. Events scheduled there will take your availability into \
             account.",
            username, calendar_name
        ),
    )
}

pub fn event_scheduled_message(username: &str, calendar_name: &str, event: &Event) -> (String, String) {
    (
        format!("New event in '{}'", calendar_name),
        format!(
            "Hello {},\n\n'{}' was scheduled in '{}' from {} to {}.",
            username,
            event.title,
            calendar_name,
            event.start_time.to_rfc3339(),
            event.end_time.to_rfc3339(),
        ),
    )
}
