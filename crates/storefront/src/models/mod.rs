//! Domain models for the storefront.

pub mod cart;
pub mod catalog;
pub mod content;
pub mod order;
pub mod user;

use serde::{Deserialize, Serialize};

use jademart_core::{Email, UserId};

/// Session storage keys.
pub mod session_keys {
    /// Key for the logged-in user.
    pub const CURRENT_USER: &str = "current_user";
    /// Key for the session cart.
    pub const CART: &str = "cart";
}

/// The logged-in user, as stored in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Database ID of the user.
    pub id: UserId,
    /// The user's email address.
    pub email: Email,
    /// Display name.
    pub name: String,
}
