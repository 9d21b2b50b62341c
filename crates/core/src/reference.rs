//! Document reference number formatting.
//!
//! Orders and invoices carry human-readable reference numbers built from the
//! issue month and a per-month sequence counter:
//!
//! - orders: `ORD-YYYYMM-####`
//! - one-time invoices: `INV-YYYYMM-####`
//! - period invoices: `PER-YYYYMM-X-##-###` where `X` is the billing-cycle
//!   initial (`M` monthly, `Q` quarterly), `##` the zero-padded cycle day and
//!   `###` the counter.
//!
//! The sequence numbers themselves come from the `shop.counter` table
//! (atomic upsert-increment); this module only formats.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Counter kinds, one sequence space per kind per month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterKind {
    Order,
    Invoice,
    Period,
}

impl CounterKind {
    /// Stored spelling of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Invoice => "invoice",
            Self::Period => "period",
        }
    }
}

/// Billing cycle for period invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    Monthly,
    Quarterly,
}

impl BillingCycle {
    /// The single-letter cycle marker embedded in period references.
    #[must_use]
    pub const fn initial(self) -> char {
        match self {
            Self::Monthly => 'M',
            Self::Quarterly => 'Q',
        }
    }
}

impl std::str::FromStr for BillingCycle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            _ => Err(format!("invalid billing cycle: {s}")),
        }
    }
}

impl std::fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Monthly => write!(f, "monthly"),
            Self::Quarterly => write!(f, "quarterly"),
        }
    }
}

/// `YYYYMM` block for a date.
#[must_use]
pub fn year_month(date: impl Datelike) -> String {
    format!("{:04}{:02}", date.year(), date.month())
}

/// Format an order reference: `ORD-YYYYMM-####`.
#[must_use]
pub fn order_reference(date: impl Datelike, seq: i32) -> String {
    format!("ORD-{}-{seq:04}", year_month(date))
}

/// Format a one-time invoice reference: `INV-YYYYMM-####`.
#[must_use]
pub fn invoice_reference(date: impl Datelike, seq: i32) -> String {
    format!("INV-{}-{seq:04}", year_month(date))
}

/// Format a period invoice reference: `PER-YYYYMM-X-##-###`.
#[must_use]
pub fn period_reference(date: impl Datelike, cycle: BillingCycle, cycle_day: u8, seq: i32) -> String {
    format!(
        "PER-{}-{}-{cycle_day:02}-{seq:03}",
        year_month(date),
        cycle.initial()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_order_reference() {
        assert_eq!(order_reference(date(2026, 3, 15), 7), "ORD-202603-0007");
        assert_eq!(order_reference(date(2026, 12, 1), 1234), "ORD-202612-1234");
    }

    #[test]
    fn test_invoice_reference() {
        assert_eq!(invoice_reference(date(2026, 1, 31), 42), "INV-202601-0042");
    }

    #[test]
    fn test_period_reference() {
        assert_eq!(
            period_reference(date(2026, 7, 1), BillingCycle::Monthly, 5, 3),
            "PER-202607-M-05-003"
        );
        assert_eq!(
            period_reference(date(2026, 7, 1), BillingCycle::Quarterly, 28, 120),
            "PER-202607-Q-28-120"
        );
    }

    #[test]
    fn test_counter_kind_spelling() {
        assert_eq!(CounterKind::Order.as_str(), "order");
        assert_eq!(CounterKind::Invoice.as_str(), "invoice");
        assert_eq!(CounterKind::Period.as_str(), "period");
    }

    #[test]
    fn test_billing_cycle_roundtrip() {
        assert_eq!("monthly".parse::<BillingCycle>().unwrap(), BillingCycle::Monthly);
        assert_eq!(BillingCycle::Quarterly.to_string(), "quarterly");
        assert_eq!(BillingCycle::Quarterly.initial(), 'Q');
    }
}
