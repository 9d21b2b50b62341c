//! Admin authentication route handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AdminError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAdmin, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Login payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl From<AuthError> for AdminError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized("Invalid credentials".to_owned()),
            AuthError::InvalidEmail(_) => Self::BadRequest("Invalid email address".to_owned()),
            AuthError::InvalidInput(msg) => Self::BadRequest(msg),
            AuthError::AccountAlreadyExists => {
                Self::Conflict("An account with this email already exists".to_owned())
            }
            AuthError::Repository(e) => Self::Database(e),
            AuthError::PasswordHash => Self::Internal("password hashing failed".to_owned()),
        }
    }
}

/// POST /auth/login
#[instrument(skip(state, session, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let auth = AuthService::new(state.admin_pool());
    let admin = auth.login(&request.email, &request.password).await?;

    // Rotate the session ID on privilege change
    session
        .cycle_id()
        .await
        .map_err(|e| AdminError::Internal(format!("failed to cycle session: {e}")))?;

    let current = CurrentAdmin {
        id: admin.id,
        email: admin.email.clone(),
        name: admin.name.clone(),
        role: admin.role,
    };
    set_current_admin(&session, &current)
        .await
        .map_err(|e| AdminError::Internal(format!("failed to write session: {e}")))?;
    set_sentry_user(&admin.id, Some(admin.email.as_str()));

    tracing::info!(admin_id = %admin.id, role = %admin.role, "admin logged in");

    Ok(Json(json!({ "admin": admin })))
}

/// POST /auth/logout
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<Value>> {
    clear_current_admin(&session)
        .await
        .map_err(|e| AdminError::Internal(format!("failed to clear session: {e}")))?;
    clear_sentry_user();

    Ok(Json(json!({ "ok": true })))
}

/// GET /auth/me
#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
) -> Result<Json<Value>> {
    let repo = crate::db::AdminUserRepository::new(state.admin_pool());
    let admin = repo
        .get_by_id(current.id)
        .await?
        .ok_or_else(|| AdminError::Unauthorized("account no longer exists".to_owned()))?;

    Ok(Json(json!({ "admin": admin })))
}
