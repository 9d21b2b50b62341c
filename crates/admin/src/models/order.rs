//! Order domain types for the back office.

use chrono::{DateTime, Utc};
use serde::Serialize;

use jademart_core::{
    LocalizedText, OrderId, OrderItemId, OrderStatus, PaymentMethod, PaymentStatus, Price,
    ProductId, UserId,
};

/// An order as seen from the back office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub reference: String,
    pub user_id: UserId,
    /// Customer email, joined for list/detail views.
    pub customer_email: String,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub subtotal: Price,
    pub shipping_fee: Price,
    pub total: Price,
    pub recipient: String,
    pub phone: String,
    pub address: String,
    pub note: Option<String>,
    pub provider_txn_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line item on an order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub name: LocalizedText,
    pub unit_price: Price,
    pub quantity: i32,
}

/// Order with line items.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}
