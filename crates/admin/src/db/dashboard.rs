//! Dashboard aggregates (shop database).

use rust_decimal::Decimal;
use sqlx::PgPool;

use super::RepositoryError;

/// Repository for the dashboard summary.
pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DashboardSummary {
    pub pending_orders: i64,
    pub processing_orders: i64,
    pub orders_this_month: i64,
    /// Paid revenue this calendar month.
    pub revenue_this_month: Decimal,
    pub published_products: i64,
    pub low_stock_products: i64,
    pub overdue_invoices: i64,
    pub active_subscribers: i64,
    pub vehicles_available: i64,
    pub vehicles_on_delivery: i64,
}

/// Stock level at or below which a product counts as low stock.
const LOW_STOCK_THRESHOLD: i32 = 5;

#[derive(sqlx::FromRow)]
struct SummaryRow {
    pending_orders: i64,
    processing_orders: i64,
    orders_this_month: i64,
    revenue_this_month: Decimal,
    published_products: i64,
    low_stock_products: i64,
    overdue_invoices: i64,
    active_subscribers: i64,
    vehicles_available: i64,
    vehicles_on_delivery: i64,
}

impl<'a> DashboardRepository<'a> {
    /// Create a new dashboard repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Compute the dashboard summary in a single round trip.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summary(&self) -> Result<DashboardSummary, RepositoryError> {
        let row = sqlx::query_as::<_, SummaryRow>(
            r"
            SELECT
                (SELECT COUNT(*) FROM shop.customer_order WHERE status = 'pending')
                    AS pending_orders,
                (SELECT COUNT(*) FROM shop.customer_order WHERE status = 'processing')
                    AS processing_orders,
                (SELECT COUNT(*) FROM shop.customer_order
                 WHERE created_at >= date_trunc('month', NOW()))
                    AS orders_this_month,
                (SELECT COALESCE(SUM(total), 0) FROM shop.customer_order
                 WHERE payment_status = 'paid'
                   AND created_at >= date_trunc('month', NOW()))
                    AS revenue_this_month,
                (SELECT COUNT(*) FROM shop.product
                 WHERE published AND deleted_at IS NULL)
                    AS published_products,
                (SELECT COUNT(*) FROM shop.product
                 WHERE published AND deleted_at IS NULL AND stock <= $1)
                    AS low_stock_products,
                (SELECT COUNT(*) FROM shop.invoice WHERE status = 'overdue')
                    AS overdue_invoices,
                (SELECT COUNT(*) FROM shop.newsletter_subscriber WHERE active)
                    AS active_subscribers,
                (SELECT COUNT(*) FROM shop.vehicle
                 WHERE status = 'Available' AND deleted_at IS NULL)
                    AS vehicles_available,
                (SELECT COUNT(*) FROM shop.vehicle
                 WHERE status = 'On Delivery' AND deleted_at IS NULL)
                    AS vehicles_on_delivery
            ",
        )
        .bind(LOW_STOCK_THRESHOLD)
        .fetch_one(self.pool)
        .await?;

        Ok(DashboardSummary {
            pending_orders: row.pending_orders,
            processing_orders: row.processing_orders,
            orders_this_month: row.orders_this_month,
            revenue_this_month: row.revenue_this_month,
            published_products: row.published_products,
            low_stock_products: row.low_stock_products,
            overdue_invoices: row.overdue_invoices,
            active_subscribers: row.active_subscribers,
            vehicles_available: row.vehicles_available,
            vehicles_on_delivery: row.vehicles_on_delivery,
        })
    }
}
