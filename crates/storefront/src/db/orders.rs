//! Order repository: checkout persistence, customer order reads, and
//! payment-webhook application.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use jademart_core::{
    LocalizedText, OrderId, OrderItemId, OrderStatus, PaymentMethod, PaymentStatus, Price,
    ProductId, UserId, VehicleStatus,
    reference::{CounterKind, order_reference},
};

use super::{CounterRepository, RepositoryError};
use crate::models::order::{DeliveryTracking, Order, OrderDetail, OrderItem, ShippingDetails};

/// Repository for customer orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

/// One repriced line ready to persist.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    /// Name frozen at purchase time.
    pub name: LocalizedText,
    /// Unit price frozen at purchase time.
    pub unit_price: Price,
    pub quantity: u32,
}

/// A fully repriced order ready to persist.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub payment_method: PaymentMethod,
    pub shipping: ShippingDetails,
    pub note: Option<String>,
    pub lines: Vec<NewOrderLine>,
    pub subtotal: Price,
    pub shipping_fee: Price,
    pub total: Price,
}

/// Outcome of applying a payment event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentApplied {
    /// The order was marked paid.
    Applied,
    /// This transaction ID was already processed; nothing changed.
    Duplicate,
    /// No order carries this reference.
    UnknownOrder,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    reference: String,
    user_id: i32,
    status: String,
    payment_method: String,
    payment_status: String,
    subtotal: Decimal,
    shipping_fee: Decimal,
    total: Decimal,
    recipient: String,
    phone: String,
    address: String,
    note: Option<String>,
    provider_txn_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let corrupt = |what: &str, detail: String| {
            RepositoryError::DataCorruption(format!("invalid {what} in database: {detail}"))
        };

        Ok(Order {
            id: OrderId::new(self.id),
            reference: self.reference,
            user_id: UserId::new(self.user_id),
            status: self
                .status
                .parse::<OrderStatus>()
                .map_err(|e| corrupt("order status", e))?,
            payment_method: self
                .payment_method
                .parse::<PaymentMethod>()
                .map_err(|e| corrupt("payment method", e))?,
            payment_status: self
                .payment_status
                .parse::<PaymentStatus>()
                .map_err(|e| corrupt("payment status", e))?,
            subtotal: Price::new(self.subtotal).map_err(|e| corrupt("subtotal", e.to_string()))?,
            shipping_fee: Price::new(self.shipping_fee)
                .map_err(|e| corrupt("shipping fee", e.to_string()))?,
            total: Price::new(self.total).map_err(|e| corrupt("total", e.to_string()))?,
            shipping: ShippingDetails {
                recipient: self.recipient,
                phone: self.phone,
                address: self.address,
            },
            note: self.note,
            provider_txn_id: self.provider_txn_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: i32,
    product_id: i32,
    name_en: String,
    name_zh: String,
    unit_price: Decimal,
    quantity: i32,
}

impl ItemRow {
    fn into_item(self) -> Result<OrderItem, RepositoryError> {
        let unit_price = Price::new(self.unit_price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid unit price in database: {e}"))
        })?;

        Ok(OrderItem {
            id: OrderItemId::new(self.id),
            product_id: ProductId::new(self.product_id),
            name: LocalizedText::new(self.name_en, self.name_zh),
            unit_price,
            quantity: self.quantity,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TrackingRow {
    vehicle_status: String,
    assigned_at: DateTime<Utc>,
    delivered_at: Option<DateTime<Utc>>,
}

const ORDER_COLUMNS: &str = "o.id, o.reference, o.user_id, o.status, o.payment_method, \
     o.payment_status, o.subtotal, o.shipping_fee, o.total, o.recipient, o.phone, \
     o.address, o.note, o.provider_txn_id, o.created_at, o.updated_at";

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a checked-out order.
    ///
    /// Allocates the `ORD` reference from the month counter, inserts the
    /// order and its items, and decrements stock, all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if any line has insufficient
    /// stock, and `RepositoryError::Database` for other failures.
    pub async fn create(&self, new_order: &NewOrder) -> Result<Order, RepositoryError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let seq = CounterRepository::next_seq_tx(&mut tx, CounterKind::Order, now, "").await?;
        let reference = order_reference(now, seq);

        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO shop.customer_order
                (reference, user_id, status, payment_method, payment_status,
                 subtotal, shipping_fee, total, recipient, phone, address, note)
            VALUES ($1, $2, 'pending', $3, 'unpaid', $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, reference, user_id, status, payment_method, payment_status,
                      subtotal, shipping_fee, total, recipient, phone, address,
                      note, provider_txn_id, created_at, updated_at
            ",
        )
        .bind(&reference)
        .bind(new_order.user_id.as_i32())
        .bind(new_order.payment_method.to_string())
        .bind(new_order.subtotal.amount())
        .bind(new_order.shipping_fee.amount())
        .bind(new_order.total.amount())
        .bind(&new_order.shipping.recipient)
        .bind(&new_order.shipping.phone)
        .bind(&new_order.shipping.address)
        .bind(&new_order.note)
        .fetch_one(&mut *tx)
        .await?;

        let order = row.into_order()?;

        for line in &new_order.lines {
            let quantity = i32::try_from(line.quantity).map_err(|_| {
                RepositoryError::Conflict("line quantity out of range".to_owned())
            })?;

            sqlx::query(
                r"
                INSERT INTO shop.order_item
                    (order_id, product_id, name_en, name_zh, unit_price, quantity)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(order.id.as_i32())
            .bind(line.product_id.as_i32())
            .bind(&line.name.en)
            .bind(&line.name.zh_tw)
            .bind(line.unit_price.amount())
            .bind(quantity)
            .execute(&mut *tx)
            .await?;

            let updated = sqlx::query(
                r"
                UPDATE shop.product
                SET stock = stock - $1
                WHERE id = $2 AND stock >= $1
                ",
            )
            .bind(quantity)
            .bind(line.product_id.as_i32())
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(RepositoryError::Conflict(format!(
                    "insufficient stock for product {}",
                    line.product_id
                )));
            }
        }

        tx.commit().await?;

        Ok(order)
    }

    /// List a customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM shop.customer_order o
            WHERE o.user_id = $1
            ORDER BY o.created_at DESC
            "
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    /// Get one of a customer's orders by reference, with items and tracking.
    ///
    /// Scoped to the owning user so customers can never read each other's
    /// orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_detail_for_user(
        &self,
        user_id: UserId,
        reference: &str,
    ) -> Result<Option<OrderDetail>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM shop.customer_order o
            WHERE o.user_id = $1 AND o.reference = $2
            "
        ))
        .bind(user_id.as_i32())
        .bind(reference)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let order = row.into_order()?;

        let items = self.items_for(order.id).await?;
        let tracking = self.tracking_for(order.id).await?;

        Ok(Some(OrderDetail {
            order,
            items,
            tracking,
        }))
    }

    /// Apply a settled online payment to an order.
    ///
    /// Records the provider transaction ID first; a replayed transaction is
    /// detected there and acknowledged without re-applying any writes. On
    /// first sight the order is marked paid and moved from `pending` to
    /// `processing`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn apply_payment(
        &self,
        order_reference: &str,
        provider_txn_id: &str,
    ) -> Result<PaymentApplied, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let recorded = sqlx::query(
            r"
            INSERT INTO shop.payment_event (provider_txn_id, order_reference)
            VALUES ($1, $2)
            ON CONFLICT (provider_txn_id) DO NOTHING
            ",
        )
        .bind(provider_txn_id)
        .bind(order_reference)
        .execute(&mut *tx)
        .await?;

        if recorded.rows_affected() == 0 {
            tx.commit().await?;
            return Ok(PaymentApplied::Duplicate);
        }

        let updated = sqlx::query(
            r"
            UPDATE shop.customer_order
            SET payment_status = 'paid',
                provider_txn_id = $2,
                status = CASE WHEN status = 'pending' THEN 'processing' ELSE status END,
                updated_at = NOW()
            WHERE reference = $1
            ",
        )
        .bind(order_reference)
        .bind(provider_txn_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(PaymentApplied::UnknownOrder);
        }

        // Settle the order's invoice too, if one was cut
        sqlx::query(
            r"
            UPDATE shop.invoice
            SET status = 'paid', paid_at = NOW()
            WHERE status IN ('pending', 'overdue')
              AND order_id = (SELECT id FROM shop.customer_order WHERE reference = $1)
            ",
        )
        .bind(order_reference)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(PaymentApplied::Applied)
    }

    /// Record a provider transaction without touching the order. Used for
    /// failed-payment events so retries stay idempotent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record_payment_event(
        &self,
        order_reference: &str,
        provider_txn_id: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO shop.payment_event (provider_txn_id, order_reference)
            VALUES ($1, $2)
            ON CONFLICT (provider_txn_id) DO NOTHING
            ",
        )
        .bind(provider_txn_id)
        .bind(order_reference)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    async fn items_for(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT id, product_id, name_en, name_zh, unit_price, quantity
            FROM shop.order_item
            WHERE order_id = $1
            ORDER BY id ASC
            ",
        )
        .bind(order_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ItemRow::into_item).collect()
    }

    async fn tracking_for(
        &self,
        order_id: OrderId,
    ) -> Result<Option<DeliveryTracking>, RepositoryError> {
        let row = sqlx::query_as::<_, TrackingRow>(
            r"
            SELECT v.status AS vehicle_status, a.assigned_at, a.delivered_at
            FROM shop.delivery_assignment a
            JOIN shop.vehicle v ON v.id = a.vehicle_id
            WHERE a.order_id = $1
            ORDER BY a.assigned_at DESC
            LIMIT 1
            ",
        )
        .bind(order_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| {
            let vehicle_status = r.vehicle_status.parse::<VehicleStatus>().map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid vehicle status in database: {e}"))
            })?;
            Ok(DeliveryTracking {
                vehicle_status,
                assigned_at: r.assigned_at,
                delivered_at: r.delivered_at,
            })
        })
        .transpose()
    }
}
