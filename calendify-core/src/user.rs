//! User accounts.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::CalendarId;
use crate::error::{CoreResult, Error};

pub type UserId = String;

pub const USERNAME_MIN_LEN: usize = 5;
pub const USERNAME_MAX_LEN: usize = 15;

/// A registered account.
///
/// `default_calendar_id` is `None` only in the window between user creation
/// and default-calendar creation. Registration is not transactional, so a
/// failure in between leaves a user without a home calendar; that state is
/// recoverable and must be tolerated by readers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: UserId,
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    /// Every calendar this user belongs to (owned or joined).
    pub calendar_ids: Vec<CalendarId>,
    pub default_calendar_id: Option<CalendarId>,
}

impl User {
    pub fn new(username: &str, password_hash: &str, email: Option<String>) -> Self {
        User {
            user_id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            email,
            calendar_ids: Vec::new(),
            default_calendar_id: None,
        }
    }

    /// Record membership of a calendar. Adding twice is a no-op.
    pub fn link_calendar(&mut self, calendar_id: &str) {
        if !self.calendar_ids.iter().any(|id| id == calendar_id) {
            self.calendar_ids.push(calendar_id.to_string());
        }
    }

    pub fn unlink_calendar(&mut self, calendar_id: &str) {
        self.calendar_ids.retain(|id| id != calendar_id);
    }
}

/// Usernames must be 5..=15 characters.
pub fn validate_username(username: &str) -> CoreResult<()> {
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(Error::Validation(format!(
            "Username must be between {} and {} characters",
            USERNAME_MIN_LEN, USERNAME_MAX_LEN
        )));
    }
    Ok(())
}
