//! Authentication route handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::auth::{RequireAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Registration payload.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Login payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/register
///
/// Creates an account and logs the new user in.
#[instrument(skip(state, session, request), fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<Value>> {
    let auth = AuthService::new(state.pool());
    let user = auth
        .register(&request.email, &request.name, &request.password)
        .await?;

    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
    };
    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("failed to write session: {e}")))?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    tracing::info!(user_id = %user.id, "user registered");

    Ok(Json(json!({ "user": user })))
}

/// POST /auth/login
#[instrument(skip(state, session, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let auth = AuthService::new(state.pool());
    let user = auth.login(&request.email, &request.password).await?;

    // Rotate the session ID on privilege change
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(format!("failed to cycle session: {e}")))?;

    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
    };
    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("failed to write session: {e}")))?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(json!({ "user": user })))
}

/// POST /auth/logout
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<Value>> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("failed to clear session: {e}")))?;
    clear_sentry_user();

    Ok(Json(json!({ "ok": true })))
}

/// GET /auth/me
///
/// Returns the logged-in user's profile.
#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<Value>> {
    let auth = AuthService::new(state.pool());
    let user = auth.get_user(current.id).await?;

    Ok(Json(json!({ "user": user })))
}
