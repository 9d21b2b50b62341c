//! Admin user domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use jademart_core::{AdminRole, AdminUserId, Email};

/// A back-office user account.
#[derive(Debug, Clone, Serialize)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: Email,
    pub name: String,
    pub role: AdminRole,
    /// Inactive accounts cannot log in.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
