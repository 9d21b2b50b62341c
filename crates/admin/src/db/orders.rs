//! Order management repository (shop database).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use jademart_core::{
    LocalizedText, OrderId, OrderItemId, OrderStatus, PaymentMethod, PaymentStatus, Price,
    ProductId, UserId,
};

use super::{RepositoryError, corrupt};
use crate::models::order::{Order, OrderDetail, OrderItem};

/// Repository for back-office order management.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

/// Filter for the order list.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    /// Matches the order reference or the customer email.
    pub query: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Outcome of a status transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The order now carries the new status.
    Applied(Box<Order>),
    /// The move is not allowed from the order's current status.
    Invalid { from: OrderStatus, to: OrderStatus },
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    reference: String,
    user_id: i32,
    customer_email: String,
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
        Ok(Order {
            id: OrderId::new(self.id),
            reference: self.reference,
            user_id: UserId::new(self.user_id),
            customer_email: self.customer_email,
            status: self.status.parse::<OrderStatus>().map_err(|e| corrupt("order status", e))?,
            payment_method: self
                .payment_method
                .parse::<PaymentMethod>()
                .map_err(|e| corrupt("payment method", e))?,
            payment_status: self
                .payment_status
                .parse::<PaymentStatus>()
                .map_err(|e| corrupt("payment status", e))?,
            subtotal: Price::new(self.subtotal).map_err(|e| corrupt("subtotal", e))?,
            shipping_fee: Price::new(self.shipping_fee).map_err(|e| corrupt("shipping fee", e))?,
            total: Price::new(self.total).map_err(|e| corrupt("total", e))?,
            recipient: self.recipient,
            phone: self.phone,
            address: self.address,
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
        Ok(OrderItem {
            id: OrderItemId::new(self.id),
            product_id: ProductId::new(self.product_id),
            name: LocalizedText::new(self.name_en, self.name_zh),
            unit_price: Price::new(self.unit_price).map_err(|e| corrupt("unit price", e))?,
            quantity: self.quantity,
        })
    }
}

const ORDER_COLUMNS: &str = "o.id, o.reference, o.user_id, u.email AS customer_email, \
     o.status, o.payment_method, o.payment_status, o.subtotal, o.shipping_fee, o.total, \
     o.recipient, o.phone, o.address, o.note, o.provider_txn_id, o.created_at, o.updated_at";

const ORDER_FROM: &str = r#"FROM shop.customer_order o JOIN shop."user" u ON u.id = o.user_id"#;

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders matching the filter, newest first, plus the total count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, filter: &OrderFilter) -> Result<(Vec<Order>, i64), RepositoryError> {
        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {ORDER_COLUMNS} {ORDER_FROM}"));
        push_order_filter(&mut query, filter);
        query.push(" ORDER BY o.created_at DESC, o.id DESC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.offset);

        let rows: Vec<OrderRow> = query.build_query_as().fetch_all(self.pool).await?;

        let mut count_query = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) {ORDER_FROM}"));
        push_order_filter(&mut count_query, filter);
        let total: i64 = count_query.build_query_scalar().fetch_one(self.pool).await?;

        let orders = rows
            .into_iter()
            .map(OrderRow::into_order)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((orders, total))
    }

    /// Get an order with its items by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_detail(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} {ORDER_FROM} WHERE o.id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let order = row.into_order()?;
        let items = self.items_for(order.id).await?;

        Ok(Some(OrderDetail { order, items }))
    }

    /// Move an order to a new status, enforcing the lifecycle rules
    /// (`pending → processing → shipped → delivered`, with cancellation
    /// allowed before shipment).
    ///
    /// The current status is re-read inside the transaction so a concurrent
    /// transition cannot slip an order past a closed state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn transition_status(
        &self,
        id: OrderId,
        to: OrderStatus,
    ) -> Result<TransitionOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<String> =
            sqlx::query_scalar("SELECT status FROM shop.customer_order WHERE id = $1 FOR UPDATE")
                .bind(id.as_i32())
                .fetch_optional(&mut *tx)
                .await?;

        let current = current.ok_or(RepositoryError::NotFound)?;
        let from = current.parse::<OrderStatus>().map_err(|e| corrupt("order status", e))?;

        if !from.can_transition_to(to) {
            tx.rollback().await?;
            return Ok(TransitionOutcome::Invalid { from, to });
        }

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            UPDATE shop.customer_order o
            SET status = $2, updated_at = NOW()
            FROM shop."user" u
            WHERE o.id = $1 AND u.id = o.user_id
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id.as_i32())
        .bind(to.to_string())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(TransitionOutcome::Applied(Box::new(row.into_order()?)))
    }

    /// Mark an offline-paid order (bank transfer, cash on delivery) as paid.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist, and
    /// `RepositoryError::Conflict` if it is already paid.
    pub async fn mark_paid(&self, id: OrderId) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            UPDATE shop.customer_order o
            SET payment_status = 'paid',
                status = CASE WHEN o.status = 'pending' THEN 'processing' ELSE o.status END,
                updated_at = NOW()
            FROM shop."user" u
            WHERE o.id = $1 AND u.id = o.user_id AND o.payment_status = 'unpaid'
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => row.into_order(),
            None => {
                let exists: Option<i32> =
                    sqlx::query_scalar("SELECT id FROM shop.customer_order WHERE id = $1")
                        .bind(id.as_i32())
                        .fetch_optional(self.pool)
                        .await?;
                match exists {
                    Some(_) => Err(RepositoryError::Conflict(
                        "order is not awaiting payment".to_owned(),
                    )),
                    None => Err(RepositoryError::NotFound),
                }
            }
        }
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
}

/// Append the shared WHERE clause for order listing and counting.
fn push_order_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &OrderFilter) {
    query.push(" WHERE TRUE");

    if let Some(status) = filter.status {
        query.push(" AND o.status = ");
        query.push_bind(status.to_string());
    }

    if let Some(payment_status) = filter.payment_status {
        query.push(" AND o.payment_status = ");
        query.push_bind(payment_status.to_string());
    }

    if let Some(q) = &filter.query {
        // escape wildcards so user input is matched literally
        let mut pattern = String::with_capacity(q.len() + 2);
        pattern.push('%');
        for c in q.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        query.push(" AND (o.reference ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR u.email ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }
}
