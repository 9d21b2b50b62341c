//! Jade Market Admin library.
//!
//! Back-office API: catalog management, order handling, invoicing,
//! delivery-fleet logistics, newsletter, and CMS content.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
