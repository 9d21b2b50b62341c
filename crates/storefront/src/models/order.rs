//! Order domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jademart_core::{
    LocalizedText, OrderId, OrderItemId, OrderStatus, PaymentMethod, PaymentStatus, Price,
    ProductId, UserId, VehicleStatus,
};

/// Shipping details captured at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingDetails {
    /// Recipient name.
    pub recipient: String,
    /// Contact phone number.
    pub phone: String,
    /// Full delivery address.
    pub address: String,
}

/// A line item, with the name and unit price frozen at purchase time.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    /// Product name at time of purchase.
    pub name: LocalizedText,
    /// Unit price at time of purchase.
    pub unit_price: Price,
    pub quantity: i32,
}

/// A customer order.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    /// Human-readable reference (`ORD-YYYYMM-####`).
    pub reference: String,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub subtotal: Price,
    pub shipping_fee: Price,
    pub total: Price,
    pub shipping: ShippingDetails,
    /// Optional customer note.
    pub note: Option<String>,
    /// Gateway transaction ID once an online payment settles.
    pub provider_txn_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order together with its line items.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    /// Delivery tracking, present once a vehicle has been assigned.
    pub tracking: Option<DeliveryTracking>,
}

/// Delivery tracking visible to the customer.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryTracking {
    /// Status of the assigned vehicle.
    pub vehicle_status: VehicleStatus,
    /// When the vehicle was assigned.
    pub assigned_at: DateTime<Utc>,
    /// When the delivery completed, if it has.
    pub delivered_at: Option<DateTime<Utc>>,
}
