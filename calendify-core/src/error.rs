//! Error types for the calendify engine.

use thiserror::Error;

use crate::availability::{render_conflicts, Conflict};
use crate::store::StoreError;

/// Errors that can occur in calendify operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    /// A group-calendar member was referenced by a username that resolves
    /// to no account.
    #[error("Member not found: {0}")]
    MemberNotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("User {user_id} is not a member of calendar {calendar_id}")]
    NotAMember { user_id: String, calendar_id: String },

    #[error("{0}")]
    Validation(String),

    #[error("Group calendars are capped at {cap} members")]
    CapacityExceeded { cap: usize },

    #[error("The default calendar cannot be deleted")]
    DefaultProtected,

    #[error("The sole member of a group calendar cannot leave it")]
    SoleMemberCannotLeave,

    #[error("Invalid interval: start must be before end")]
    InvalidInterval,

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The availability scan found overlapping events. Carries the full
    /// per-member conflict list; the message enumerates every busy member.
    #[error("{}", render_conflicts(.0))]
    SchedulingConflict(Vec<Conflict>),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for calendify operations.
pub type CoreResult<T> = Result<T, Error>;
