//! Personal and group calendar endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use calendify_core::{AddMemberOutcome, Calendar, CalendarColor, CalendarPatch, RemoveMemberOutcome};

use crate::routes::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/group-calendar/create", post(create_group))
        .route("/group-calendar/{calendar_id}/add-user", post(add_user))
        .route("/group-calendar/{calendar_id}/remove-user", post(remove_user))
        .route("/group-calendar/{calendar_id}/leave", post(leave_group))
        .route("/group-calendar/{calendar_id}/delete", post(delete_group))
        .route("/personal-calendar/create", post(create_personal))
        .route("/personal-calendar/{calendar_id}/delete", post(delete_personal))
        .route("/calendar/{calendar_id}/edit", put(edit_calendar))
        .route("/user/{user_id}/calendars", get(list_calendars))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub owner_id: String,
    pub name: String,
    /// Usernames of the initial members; the owner is implicit.
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub color: CalendarColor,
}

/// POST /group-calendar/create
async fn create_group(
    State(state): State<AppState>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let calendar = state
        .calendars
        .create_group_calendar(&req.owner_id, &req.name, &req.members, req.color)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Group calendar created successfully",
            "calendarId": calendar.calendar_id,
        })),
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRequest {
    pub admin_id: String,
    pub user_id: String,
}

/// POST /group-calendar/:id/add-user - Owner adds a member; idempotent
async fn add_user(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
    Json(req): Json<MembershipRequest>,
) -> Result<Json<Value>, ApiError> {
    let outcome = state
        .calendars
        .add_member(&calendar_id, &req.admin_id, &req.user_id)
        .await?;
    let message = match outcome {
        AddMemberOutcome::Added => "User added successfully",
        AddMemberOutcome::AlreadyMember => "User already in group calendar",
    };
    Ok(Json(json!({ "message": message })))
}

/// POST /group-calendar/:id/remove-user - Owner removes a member; idempotent
async fn remove_user(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
    Json(req): Json<MembershipRequest>,
) -> Result<Json<Value>, ApiError> {
    let outcome = state
        .calendars
        .remove_member(&calendar_id, &req.admin_id, &req.user_id)
        .await?;
    let message = match outcome {
        RemoveMemberOutcome::Removed => "User removed successfully",
        RemoveMemberOutcome::NotAMember => "User not in group calendar",
    };
    Ok(Json(json!({ "message": message })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRequest {
    pub user_id: String,
}

/// POST /group-calendar/:id/leave - Leave; ownership transfers if the
/// owner leaves with members remaining.
async fn leave_group(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
    Json(req): Json<ActorRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .calendars
        .leave_group_calendar(&calendar_id, &req.user_id)
        .await?;
    Ok(Json(json!({ "message": "Left group calendar" })))
}

/// POST /group-calendar/:id/delete - Owner-only cascade delete
async fn delete_group(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
    Json(req): Json<ActorRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .calendars
        .delete_group_calendar(&calendar_id, &req.user_id)
        .await?;
    Ok(Json(json!({ "message": "Group calendar deleted successfully" })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonalRequest {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub color: CalendarColor,
}

/// POST /personal-calendar/create
async fn create_personal(
    State(state): State<AppState>,
    Json(req): Json<CreatePersonalRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let calendar = state
        .calendars
        .create_personal_calendar(&req.user_id, &req.name, req.color)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Personal calendar created successfully",
            "calendarId": calendar.calendar_id,
        })),
    ))
}

/// POST /personal-calendar/:id/delete - Owner-only; default calendar is
/// protected; cascades to the calendar's events.
async fn delete_personal(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
    Json(req): Json<ActorRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .calendars
        .delete_personal_calendar(&calendar_id, &req.user_id)
        .await?;
    Ok(Json(json!({ "message": "Personal calendar deleted successfully" })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditCalendarRequest {
    pub user_id: String,
    pub name: Option<String>,
    pub color: Option<CalendarColor>,
}

/// PUT /calendar/:id/edit - Owner-only rename/recolor
async fn edit_calendar(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
    Json(req): Json<EditCalendarRequest>,
) -> Result<Json<Calendar>, ApiError> {
    let patch = CalendarPatch { name: req.name, color: req.color };
    let calendar = state
        .calendars
        .edit_calendar(&calendar_id, &req.user_id, patch)
        .await?;
    Ok(Json(calendar))
}

/// GET /user/:id/calendars - Every calendar the user belongs to
async fn list_calendars(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Calendar>>, ApiError> {
    let calendars = state.calendars.list_calendars(&user_id).await?;
    Ok(Json(calendars))
}
