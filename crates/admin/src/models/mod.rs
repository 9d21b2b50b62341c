//! Domain models for the admin panel.

pub mod admin_user;
pub mod catalog;
pub mod content;
pub mod invoice;
pub mod logistics;
pub mod newsletter;
pub mod order;

use serde::{Deserialize, Serialize};

use jademart_core::{AdminRole, AdminUserId, Email};

/// Session storage keys.
pub mod session_keys {
    /// Key for the logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}

/// The logged-in admin, as stored in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Database ID of the admin user.
    pub id: AdminUserId,
    /// The admin's email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Role controlling write/super access.
    pub role: AdminRole,
}
