//! Back-office services: authentication, email delivery, asset uploads.

pub mod assets;
pub mod auth;
pub mod email;
