//! Admin middleware: sessions and role-gated auth extractors.

pub mod auth;
pub mod session;

pub use auth::{
    RequireAdmin, RequireSuperAdmin, RequireWriteAccess, clear_current_admin, set_current_admin,
};
pub use session::create_session_layer;
