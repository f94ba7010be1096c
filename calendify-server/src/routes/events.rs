//! Event endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use calendify_core::{Event, EventDraft, EventPatch};

use crate::routes::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/calendar/{calendar_id}/event", post(create_event))
        .route("/calendar/{calendar_id}/events", get(list_events))
        .route("/calendar/{calendar_id}/event/{event_id}/update", put(update_event))
        .route("/calendar/{calendar_id}/event/{event_id}/delete", delete(delete_event))
}

/// Actor identity for reads and deletes, passed as a query parameter.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorQuery {
    pub user_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub user_id: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub description: Option<String>,
    pub locked: Option<bool>,
}

/// POST /calendar/:id/event - Create an event; group calendars scan member
/// availability first and reject with 409 on any overlap.
async fn create_event(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let draft = EventDraft {
        title: req.title,
        start_time: req.start_time,
        end_time: req.end_time,
        description: req.description,
        locked: req.locked,
    };
    let event = state
        .events
        .create_event(&calendar_id, &req.user_id, draft)
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /calendar/:id/events - List a calendar's events (members only)
async fn list_events(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
    Query(actor): Query<ActorQuery>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let events = state.events.list_events(&calendar_id, &actor.user_id).await?;
    Ok(Json(events))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub user_id: String,
    pub title: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub locked: Option<bool>,
}

/// PUT /calendar/:id/event/:event_id/update - Creator-only field update
async fn update_event(
    State(state): State<AppState>,
    Path((calendar_id, event_id)): Path<(String, String)>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<Event>, ApiError> {
    let patch = EventPatch {
        title: req.title,
        start_time: req.start_time,
        end_time: req.end_time,
        description: req.description,
        locked: req.locked,
    };
    let event = state
        .events
        .update_event(&calendar_id, &event_id, &req.user_id, patch)
        .await?;
    Ok(Json(event))
}

/// DELETE /calendar/:id/event/:event_id/delete - Creator-only removal
async fn delete_event(
    State(state): State<AppState>,
    Path((calendar_id, event_id)): Path<(String, String)>,
    Query(actor): Query<ActorQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .events
        .delete_event(&calendar_id, &event_id, &actor.user_id)
        .await?;
    Ok(Json(serde_json::json!({ "message": "Event deleted successfully" })))
}
