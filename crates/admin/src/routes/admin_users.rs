//! Admin account management (super admin only).

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use jademart_core::{AdminRole, AdminUserId};

use crate::db::AdminUserRepository;
use crate::error::{AdminError, Result};
use crate::middleware::RequireSuperAdmin;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Payload for creating an admin account.
#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub email: String,
    pub name: String,
    pub role: AdminRole,
    pub password: String,
}

/// Payload for updating an admin account. Omitted fields stay unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateAdminRequest {
    pub role: Option<AdminRole>,
    pub active: Option<bool>,
}

/// GET /admin-users
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    RequireSuperAdmin(_): RequireSuperAdmin,
) -> Result<Json<Value>> {
    let repo = AdminUserRepository::new(state.admin_pool());
    let admins = repo.list().await?;

    Ok(Json(json!({ "admins": admins })))
}

/// POST /admin-users
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn create(
    State(state): State<AppState>,
    RequireSuperAdmin(_): RequireSuperAdmin,
    Json(request): Json<CreateAdminRequest>,
) -> Result<Json<Value>> {
    let auth = AuthService::new(state.admin_pool());
    let admin = auth
        .create_account(&request.email, &request.name, request.role, &request.password)
        .await?;

    tracing::info!(admin_id = %admin.id, role = %admin.role, "admin account created");

    Ok(Json(json!({ "admin": admin })))
}

/// PATCH /admin-users/{id}
#[instrument(skip(state, request))]
pub async fn update(
    State(state): State<AppState>,
    RequireSuperAdmin(current): RequireSuperAdmin,
    Path(id): Path<i32>,
    Json(request): Json<UpdateAdminRequest>,
) -> Result<Json<Value>> {
    let id = AdminUserId::new(id);

    // Locking yourself out takes a second super admin
    if id == current.id && request.active == Some(false) {
        return Err(AdminError::Conflict(
            "cannot deactivate your own account".to_owned(),
        ));
    }

    let repo = AdminUserRepository::new(state.admin_pool());
    let admin = repo.update(id, request.role, request.active).await?;

    Ok(Json(json!({ "admin": admin })))
}

/// DELETE /admin-users/{id}
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    RequireSuperAdmin(current): RequireSuperAdmin,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let id = AdminUserId::new(id);

    if id == current.id {
        return Err(AdminError::Conflict(
            "cannot delete your own account".to_owned(),
        ));
    }

    let repo = AdminUserRepository::new(state.admin_pool());
    repo.delete(id).await?;

    tracing::info!(admin_id = %id, "admin account deleted");

    Ok(Json(json!({ "ok": true })))
}
