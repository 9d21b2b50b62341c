//! Shared domain types.

pub mod email;
pub mod id;
pub mod price;
pub mod status;
pub mod text;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use status::{
    AdminRole, InvoiceKind, InvoiceStatus, OrderStatus, PaymentMethod, PaymentStatus,
    VehicleStatus,
};
pub use text::{Locale, LocalizedText, LocalizedTextError};
