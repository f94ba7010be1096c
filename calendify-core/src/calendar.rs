//! Calendar documents: personal, default and group calendars.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::UserId;

pub type CalendarId = String;

/// Maximum number of members in a group calendar, owner included.
pub const GROUP_MEMBER_CAP: usize = 5;

/// Display colors a calendar can be assigned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarColor {
    #[default]
    Blue,
    Pink,
    Green,
    Yellow,
    Red,
    Purple,
    Orange,
}

/// A calendar document.
///
/// `members` keeps insertion order: when a group owner leaves, ownership
/// passes to the first remaining member of the sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub calendar_id: CalendarId,
    pub name: String,
    pub owner_id: UserId,
    pub is_group: bool,
    pub is_default: bool,
    pub members: Vec<UserId>,
    pub color: CalendarColor,
}

impl Calendar {
    /// A personal calendar: exactly one member, the owner.
    pub fn personal(owner_id: &str, name: &str, color: CalendarColor) -> Self {
        Calendar {
            calendar_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            owner_id: owner_id.to_string(),
            is_group: false,
            is_default: false,
            members: vec![owner_id.to_string()],
            color,
        }
    }

    /// The default calendar auto-created at registration. Never deletable.
    pub fn default_for(owner_id: &str, username: &str) -> Self {
        let mut calendar = Calendar::personal(owner_id, &format!("{}'s calendar", username), CalendarColor::default());
        calendar.is_default = true;
        calendar
    }

    /// A group calendar. The owner is always the first member; duplicate
    /// member ids collapse to their first occurrence.
    pub fn group(owner_id: &str, name: &str, member_ids: &[UserId], color: CalendarColor) -> Self {
        let mut members: Vec<UserId> = vec![owner_id.to_string()];
        for id in member_ids {
            if !members.contains(id) {
                members.push(id.clone());
            }
        }
        Calendar {
            calendar_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            owner_id: owner_id.to_string(),
            is_group: true,
            is_default: false,
            members,
            color,
        }
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|id| id == user_id)
    }

    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

/// Owner-editable calendar fields. Unknown fields are rejected at the
/// deserialization boundary rather than silently ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CalendarPatch {
    pub name: Option<String>,
    pub color: Option<CalendarColor>,
}

impl CalendarPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none()
    }
}
