//! Membership and ownership gates.
//!
//! Pure predicates over already-loaded documents; no I/O. The lifecycle
//! services run these before every write, since the store itself enforces
//! nothing.

use crate::calendar::{Calendar, GROUP_MEMBER_CAP};
use crate::error::{CoreResult, Error};

/// Outcome of an admission check for a new member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddMemberCheck {
    Admissible,
    /// Already in `members`; adding again is treated as a success no-op.
    AlreadyMember,
}

/// Only the owner may mutate a group calendar's membership or settings.
pub fn can_mutate_group(calendar: &Calendar, actor_id: &str) -> CoreResult<()> {
    if !calendar.is_owner(actor_id) {
        return Err(Error::Forbidden(
            "Only the calendar owner can modify the calendar".to_string(),
        ));
    }
    Ok(())
}

/// Admission check for `candidate_id` against the membership cap.
pub fn can_add_member(calendar: &Calendar, candidate_id: &str) -> CoreResult<AddMemberCheck> {
    if calendar.is_member(candidate_id) {
        return Ok(AddMemberCheck::AlreadyMember);
    }
    if calendar.members.len() >= GROUP_MEMBER_CAP {
        return Err(Error::CapacityExceeded { cap: GROUP_MEMBER_CAP });
    }
    Ok(AddMemberCheck::Admissible)
}

/// Deletion requires ownership and never touches a default calendar,
/// regardless of who asks.
pub fn can_delete_calendar(calendar: &Calendar, actor_id: &str) -> CoreResult<()> {
    if !calendar.is_owner(actor_id) {
        return Err(Error::Forbidden(
            "Only the calendar owner can delete the calendar".to_string(),
        ));
    }
    if calendar.is_default {
        return Err(Error::DefaultProtected);
    }
    Ok(())
}
