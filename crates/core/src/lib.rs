//! Jade Market Core - Shared types library.
//!
//! This crate provides common types used across all Jade Market components:
//! - `storefront` - Public-facing commerce API
//! - `admin` - Internal back-office API
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, localized
//!   text, and status enums
//! - [`reference`] - Document reference number formatting (orders, invoices)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod reference;
pub mod types;

pub use types::*;
