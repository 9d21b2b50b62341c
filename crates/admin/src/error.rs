//! Unified error handling with Sentry integration.
//!
//! All admin route handlers return `Result<T, AdminError>`; the client
//! always receives `{ "error": "..." }` with an appropriate status.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::email::EmailError;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Email delivery failed.
    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Admin is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Admin lacks the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Conflict with existing state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        // Repository not-found/conflict outcomes are client errors, not ours
        let this = match self {
            Self::Database(RepositoryError::NotFound) => {
                Self::NotFound("resource not found".to_string())
            }
            Self::Database(RepositoryError::Conflict(msg)) => Self::Conflict(msg),
            other => other,
        };
        this.respond()
    }
}

impl AdminError {
    fn respond(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_) | Self::Email(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) | Self::Email(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Email(_) => "Email delivery failed".to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AdminError`.
pub type Result<T> = std::result::Result<T, AdminError>;

/// Set the Sentry user context from an admin ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AdminError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_repository_outcomes_map_to_client_statuses() {
        assert_eq!(
            status_of(AdminError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AdminError::Database(RepositoryError::Conflict(
                "slug taken".to_string()
            ))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AdminError::Database(RepositoryError::DataCorruption(
                "bad".to_string()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_admin_error_status_codes() {
        assert_eq!(
            status_of(AdminError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AdminError::Forbidden("x".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AdminError::Conflict("x".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AdminError::Internal("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
