//! Role-gated authentication extractors.
//!
//! Handlers take `RequireAdmin` (any logged-in admin, viewers included),
//! `RequireWriteAccess` (admin or super admin), or `RequireSuperAdmin`
//! (account management only).

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{CurrentAdmin, session_keys};

/// Extractor that requires a logged-in admin of any role.
pub struct RequireAdmin(pub CurrentAdmin);

/// Extractor that requires a role allowed to mutate store data.
pub struct RequireWriteAccess(pub CurrentAdmin);

/// Extractor that requires the super admin role.
pub struct RequireSuperAdmin(pub CurrentAdmin);

/// Rejection for unauthenticated or under-privileged requests.
pub enum AuthRejection {
    Unauthenticated,
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Authentication required" })),
            )
                .into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "Insufficient role" })),
            )
                .into_response(),
        }
    }
}

async fn current_admin(parts: &mut Parts) -> Result<CurrentAdmin, AuthRejection> {
    // Session is placed in extensions by SessionManagerLayer
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unauthenticated)?;

    session
        .get(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
        .ok_or(AuthRejection::Unauthenticated)
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_admin(parts).await.map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireWriteAccess
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = current_admin(parts).await?;
        if !admin.role.can_write() {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(admin))
    }
}

impl<S> FromRequestParts<S> for RequireSuperAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = current_admin(parts).await?;
        if admin.role != jademart_core::AdminRole::SuperAdmin {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(admin))
    }
}

/// Set the current admin in the session after login.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Clear the current admin from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN).await?;
    Ok(())
}
