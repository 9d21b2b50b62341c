//! Status enums for orders, payments, invoices, vehicles, and admin roles.
//!
//! Stored as text in PostgreSQL; every enum carries `Display`/`FromStr` with
//! the exact stored spelling so repository code can round-trip rows without a
//! custom sqlx type per schema.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Transitions are validated with [`OrderStatus::can_transition_to`];
/// `delivered` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether `next` is a legal direct transition from `self`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing | Self::Cancelled)
                | (Self::Processing, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
        )
    }

    /// Whether the status admits no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// How the customer chose to pay at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Online card payment through the payment gateway.
    Online,
    /// Manual bank transfer, confirmed by an admin.
    BankTransfer,
    /// Cash on delivery.
    CashOnDelivery,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::BankTransfer => write!(f, "bank_transfer"),
            Self::CashOnDelivery => write!(f, "cash_on_delivery"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(Self::Online),
            "bank_transfer" => Ok(Self::BankTransfer),
            "cash_on_delivery" => Ok(Self::CashOnDelivery),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Whether an order has been paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
    Refunded,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unpaid => write!(f, "unpaid"),
            Self::Paid => write!(f, "paid"),
            Self::Refunded => write!(f, "refunded"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(Self::Unpaid),
            "paid" => Ok(Self::Paid),
            "refunded" => Ok(Self::Refunded),
            _ => Err(format!("invalid payment status: {s}")),
        }
    }
}

/// Invoice lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Paid => write!(f, "paid"),
            Self::Overdue => write!(f, "overdue"),
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            _ => Err(format!("invalid invoice status: {s}")),
        }
    }
}

/// One-time order invoice vs. recurring period invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceKind {
    OneTime,
    Period,
}

impl std::fmt::Display for InvoiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OneTime => write!(f, "one_time"),
            Self::Period => write!(f, "period"),
        }
    }
}

impl std::str::FromStr for InvoiceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one_time" => Ok(Self::OneTime),
            "period" => Ok(Self::Period),
            _ => Err(format!("invalid invoice kind: {s}")),
        }
    }
}

/// Delivery vehicle status.
///
/// Serialized (and stored) exactly as the display strings the fleet data
/// has always used: `Available`, `On Delivery`, `Maintenance`,
/// `Out of Service`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum VehicleStatus {
    #[default]
    Available,
    #[serde(rename = "On Delivery")]
    OnDelivery,
    Maintenance,
    #[serde(rename = "Out of Service")]
    OutOfService,
}

impl VehicleStatus {
    /// Whether a vehicle in this status can take a new assignment.
    #[must_use]
    pub const fn can_accept_assignment(self) -> bool {
        matches!(self, Self::Available)
    }
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "Available"),
            Self::OnDelivery => write!(f, "On Delivery"),
            Self::Maintenance => write!(f, "Maintenance"),
            Self::OutOfService => write!(f, "Out of Service"),
        }
    }
}

impl std::str::FromStr for VehicleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(Self::Available),
            "On Delivery" => Ok(Self::OnDelivery),
            "Maintenance" => Ok(Self::Maintenance),
            "Out of Service" => Ok(Self::OutOfService),
            _ => Err(format!("invalid vehicle status: {s}")),
        }
    }
}

/// Admin role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Full access to all admin features including admin-user management.
    SuperAdmin,
    /// Full access to store management features.
    Admin,
    /// Read-only access to store data.
    Viewer,
}

impl AdminRole {
    /// Whether this role may mutate store data.
    #[must_use]
    pub const fn can_write(self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super_admin"),
            Self::Admin => write!(f, "admin"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!("invalid admin role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_transitions() {
        use OrderStatus::{Cancelled, Delivered, Pending, Processing, Shipped};

        assert!(Pending.can_transition_to(Processing));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Processing.can_transition_to(Cancelled));
        assert!(Shipped.can_transition_to(Delivered));

        assert!(!Pending.can_transition_to(Shipped));
        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Shipped.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Processing));

        assert!(Delivered.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Shipped.is_terminal());
    }

    #[test]
    fn test_vehicle_status_spelling() {
        assert_eq!(VehicleStatus::OnDelivery.to_string(), "On Delivery");
        assert_eq!(
            "Out of Service".parse::<VehicleStatus>().unwrap(),
            VehicleStatus::OutOfService
        );
        let json = serde_json::to_string(&VehicleStatus::OnDelivery).unwrap();
        assert_eq!(json, "\"On Delivery\"");
    }

    #[test]
    fn test_vehicle_assignment_gate() {
        assert!(VehicleStatus::Available.can_accept_assignment());
        assert!(!VehicleStatus::OnDelivery.can_accept_assignment());
        assert!(!VehicleStatus::Maintenance.can_accept_assignment());
    }

    #[test]
    fn test_snake_case_roundtrips() {
        for (s, v) in [
            ("pending", OrderStatus::Pending),
            ("processing", OrderStatus::Processing),
            ("shipped", OrderStatus::Shipped),
            ("delivered", OrderStatus::Delivered),
            ("cancelled", OrderStatus::Cancelled),
        ] {
            assert_eq!(s.parse::<OrderStatus>().unwrap(), v);
            assert_eq!(v.to_string(), s);
        }

        assert_eq!(
            serde_json::to_string(&InvoiceKind::OneTime).unwrap(),
            "\"one_time\""
        );
        assert_eq!(
            "bank_transfer".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::BankTransfer
        );
    }

    #[test]
    fn test_admin_role_permissions() {
        assert!(AdminRole::SuperAdmin.can_write());
        assert!(AdminRole::Admin.can_write());
        assert!(!AdminRole::Viewer.can_write());
    }
}
