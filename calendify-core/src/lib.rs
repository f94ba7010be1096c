//! Core engine for calendify: shared calendars with group scheduling.
//!
//! Users own personal calendars and share group calendars of up to five
//! members. Events belong to exactly one calendar; admitting an event to a
//! group calendar requires that no member is busy anywhere across all of
//! their calendars. Documents are stored independently (no cross-document
//! transactions), so every referential invariant is enforced here, before
//! each write.

pub mod availability;
pub mod calendar;
pub mod calendars;
pub mod error;
pub mod event;
pub mod events;
pub mod notify;
pub mod rules;
pub mod store;
pub mod user;
pub mod users;

#[cfg(test)]
pub(crate) mod testutil;

pub use availability::{check_availability, overlaps, Conflict};
pub use calendar::{Calendar, CalendarColor, CalendarId, CalendarPatch, GROUP_MEMBER_CAP};
pub use calendars::{AddMemberOutcome, CalendarService, RemoveMemberOutcome};
pub use error::{CoreResult, Error};
pub use event::{Event, EventDraft, EventId, EventPatch};
pub use events::EventService;
pub use notify::{LogNotifier, Notifier};
pub use store::{EntityStore, MemoryStore, StoreError};
pub use user::{User, UserId};
pub use users::{PasswordHasher, UserService};
