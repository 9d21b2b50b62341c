//! Invoice domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jademart_core::{InvoiceId, InvoiceKind, InvoiceStatus, OrderId, Price, UserId, reference::BillingCycle};

/// An invoice, either one-time (cut from a single order) or period
/// (aggregating a customer's paid orders over a date range).
#[derive(Debug, Clone, Serialize)]
pub struct Invoice {
    pub id: InvoiceId,
    /// `INV-YYYYMM-####` or `PER-YYYYMM-X-##-###`.
    pub reference: String,
    pub kind: InvoiceKind,
    pub status: InvoiceStatus,
    /// Present for one-time invoices.
    pub order_id: Option<OrderId>,
    /// Present for period invoices.
    pub user_id: Option<UserId>,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub amount: Price,
    /// Period invoices only.
    pub billing_cycle: Option<BillingCycle>,
    /// Day of month the billing cycle anchors on (period invoices only).
    pub cycle_day: Option<i32>,
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
    /// The orders a period invoice aggregates.
    pub order_ids: Vec<OrderId>,
    pub issued_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
}

/// Input for issuing a period invoice.
#[derive(Debug, Clone, Deserialize)]
pub struct PeriodInvoiceInput {
    /// Customer whose paid orders the invoice aggregates.
    pub user_id: UserId,
    pub billing_cycle: BillingCycle,
    /// Day of month (1-28) the cycle anchors on.
    pub cycle_day: u8,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    /// Days until the invoice is due (default 14).
    pub due_in_days: Option<i64>,
}
