//! Newsletter subscriber types for the back office.

use chrono::{DateTime, Utc};
use serde::Serialize;

use jademart_core::SubscriberId;

/// A newsletter subscriber.
#[derive(Debug, Clone, Serialize)]
pub struct Subscriber {
    pub id: SubscriberId,
    pub email: String,
    pub active: bool,
    pub subscribed_at: DateTime<Utc>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
}
