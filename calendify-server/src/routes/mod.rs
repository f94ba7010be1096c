pub mod calendars;
pub mod events;
pub mod users;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use calendify_core::Error;

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert engine errors to HTTP responses.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::CalendarNotFound(_)
            | Error::EventNotFound(_)
            | Error::UserNotFound(_)
            | Error::MemberNotFound(_) => StatusCode::NOT_FOUND,
            Error::Forbidden(_) | Error::NotAMember { .. } => StatusCode::FORBIDDEN,
            Error::Validation(_)
            | Error::CapacityExceeded { .. }
            | Error::DefaultProtected
            | Error::SoleMemberCannotLeave
            | Error::InvalidInterval => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::SchedulingConflict(_) => StatusCode::CONFLICT,
            Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let Error::Store(err) = &self.0 {
            tracing::error!(%err, "store failure");
        }

        // Conflicts carry structured detail alongside the rendered message.
        match &self.0 {
            Error::SchedulingConflict(conflicts) => {
                let body = json!({ "error": self.0.to_string(), "conflicts": conflicts });
                (status, Json(body)).into_response()
            }
            _ => {
                let body = ErrorResponse { error: self.0.to_string() };
                (status, Json(body)).into_response()
            }
        }
    }
}
