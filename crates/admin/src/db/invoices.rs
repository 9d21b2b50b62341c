//! Invoice repository (shop database).
//!
//! One-time invoices are cut from an existing order and reuse its total;
//! period invoices aggregate a customer's paid orders over a date range.
//! Both draw reference numbers from the same per-month counter table the
//! storefront uses for orders.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use jademart_core::{
    InvoiceId, InvoiceKind, InvoiceStatus, OrderId, Price, UserId,
    reference::{BillingCycle, CounterKind, invoice_reference, period_reference},
};

use super::{RepositoryError, corrupt};
use crate::models::invoice::{Invoice, PeriodInvoiceInput};

/// Default days-until-due when the caller does not specify one.
const DEFAULT_DUE_DAYS: i64 = 14;

/// Repository for invoices.
pub struct InvoiceRepository<'a> {
    pool: &'a PgPool,
}

/// Filter for the invoice list.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub kind: Option<InvoiceKind>,
    pub status: Option<InvoiceStatus>,
    pub user_id: Option<UserId>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(sqlx::FromRow)]
struct InvoiceRow {
    id: i32,
    reference: String,
    kind: String,
    status: String,
    order_id: Option<i32>,
    user_id: Option<i32>,
    customer_name: String,
    customer_email: Option<String>,
    amount: Decimal,
    billing_cycle: Option<String>,
    cycle_day: Option<i32>,
    period_start: Option<DateTime<Utc>>,
    period_end: Option<DateTime<Utc>>,
    order_ids: Vec<i32>,
    issued_at: DateTime<Utc>,
    due_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
    sent_at: Option<DateTime<Utc>>,
}

impl InvoiceRow {
    fn into_invoice(self) -> Result<Invoice, RepositoryError> {
        let billing_cycle = self
            .billing_cycle
            .map(|c| c.parse::<BillingCycle>())
            .transpose()
            .map_err(|e| corrupt("billing cycle", e))?;

        Ok(Invoice {
            id: InvoiceId::new(self.id),
            reference: self.reference,
            kind: self.kind.parse::<InvoiceKind>().map_err(|e| corrupt("invoice kind", e))?,
            status: self.status.parse::<InvoiceStatus>().map_err(|e| corrupt("invoice status", e))?,
            order_id: self.order_id.map(OrderId::new),
            user_id: self.user_id.map(UserId::new),
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            amount: Price::new(self.amount).map_err(|e| corrupt("invoice amount", e))?,
            billing_cycle,
            cycle_day: self.cycle_day,
            period_start: self.period_start,
            period_end: self.period_end,
            order_ids: self.order_ids.into_iter().map(OrderId::new).collect(),
            issued_at: self.issued_at,
            due_at: self.due_at,
            paid_at: self.paid_at,
            sent_at: self.sent_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SeqRow {
    seq: i32,
}

const INVOICE_COLUMNS: &str = "id, reference, kind, status, order_id, user_id, customer_name, \
     customer_email, amount, billing_cycle, cycle_day, period_start, period_end, order_ids, \
     issued_at, due_at, paid_at, sent_at";

impl<'a> InvoiceRepository<'a> {
    /// Create a new invoice repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Cut a one-time invoice from an order.
    ///
    /// The amount is the order total and the customer details come from the
    /// order's shipping block and account email. At most one invoice exists
    /// per order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist, and
    /// `RepositoryError::Conflict` if the order is already invoiced.
    pub async fn create_for_order(&self, order_id: OrderId) -> Result<Invoice, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct OrderSource {
            total: Decimal,
            recipient: String,
            email: String,
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let source = sqlx::query_as::<_, OrderSource>(
            r#"
            SELECT o.total, o.recipient, u.email
            FROM shop.customer_order o
            JOIN shop."user" u ON u.id = o.user_id
            WHERE o.id = $1
            "#,
        )
        .bind(order_id.as_i32())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let seq = next_seq(&mut tx, CounterKind::Invoice, now, "").await?;
        let reference = invoice_reference(now, seq);

        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            r"
            INSERT INTO shop.invoice
                (reference, kind, status, order_id, customer_name, customer_email,
                 amount, issued_at, due_at)
            VALUES ($1, 'one_time', 'pending', $2, $3, $4, $5, $6, $7)
            RETURNING {INVOICE_COLUMNS}
            "
        ))
        .bind(&reference)
        .bind(order_id.as_i32())
        .bind(&source.recipient)
        .bind(&source.email)
        .bind(source.total)
        .bind(now)
        .bind(now + Duration::days(DEFAULT_DUE_DAYS))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "order is already invoiced"))?;

        tx.commit().await?;
        row.into_invoice()
    }

    /// Issue a period invoice aggregating a customer's paid orders in the
    /// given range.
    ///
    /// The amount is the sum of the matched order totals and the order IDs
    /// are stored on the invoice. The reference embeds the billing-cycle
    /// initial and the cycle day; the sequence counts within that
    /// `(cycle, day)` slot per month.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist,
    /// and `RepositoryError::Conflict` when no paid orders fall in the range.
    pub async fn create_period(
        &self,
        input: &PeriodInvoiceInput,
    ) -> Result<Invoice, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Customer {
            name: String,
            email: String,
        }

        #[derive(sqlx::FromRow)]
        struct PaidOrder {
            id: i32,
            total: Decimal,
        }

        let now = Utc::now();
        let due_days = input.due_in_days.unwrap_or(DEFAULT_DUE_DAYS);
        let period = format!("{}-{:02}", input.billing_cycle.initial(), input.cycle_day);

        let mut tx = self.pool.begin().await?;

        let customer = sqlx::query_as::<_, Customer>(
            r#"SELECT name, email FROM shop."user" WHERE id = $1"#,
        )
        .bind(input.user_id.as_i32())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let orders = sqlx::query_as::<_, PaidOrder>(
            r"
            SELECT id, total
            FROM shop.customer_order
            WHERE user_id = $1
              AND payment_status = 'paid'
              AND created_at >= $2 AND created_at < $3
            ORDER BY id ASC
            ",
        )
        .bind(input.user_id.as_i32())
        .bind(input.period_start)
        .bind(input.period_end)
        .fetch_all(&mut *tx)
        .await?;

        if orders.is_empty() {
            return Err(RepositoryError::Conflict(
                "no paid orders in the billing period".to_owned(),
            ));
        }

        let amount: Decimal = orders.iter().map(|o| o.total).sum();
        let order_ids: Vec<i32> = orders.iter().map(|o| o.id).collect();

        let seq = next_seq(&mut tx, CounterKind::Period, now, &period).await?;
        let reference = period_reference(now, input.billing_cycle, input.cycle_day, seq);

        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            r"
            INSERT INTO shop.invoice
                (reference, kind, status, user_id, customer_name, customer_email, amount,
                 billing_cycle, cycle_day, period_start, period_end, order_ids,
                 issued_at, due_at)
            VALUES ($1, 'period', 'pending', $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {INVOICE_COLUMNS}
            "
        ))
        .bind(&reference)
        .bind(input.user_id.as_i32())
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(amount)
        .bind(input.billing_cycle.to_string())
        .bind(i32::from(input.cycle_day))
        .bind(input.period_start)
        .bind(input.period_end)
        .bind(&order_ids)
        .bind(now)
        .bind(now + Duration::days(due_days))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        row.into_invoice()
    }

    /// List invoices matching the filter, newest first, plus the total count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &InvoiceFilter,
    ) -> Result<(Vec<Invoice>, i64), RepositoryError> {
        let kind = filter.kind.map(|k| k.to_string());
        let status = filter.status.map(|s| s.to_string());
        let user_id = filter.user_id.map(|u| u.as_i32());

        let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
            r"
            SELECT {INVOICE_COLUMNS}
            FROM shop.invoice
            WHERE ($1::TEXT IS NULL OR kind = $1)
              AND ($2::TEXT IS NULL OR status = $2)
              AND ($3::INTEGER IS NULL OR user_id = $3)
            ORDER BY issued_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "
        ))
        .bind(&kind)
        .bind(&status)
        .bind(user_id)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*)
            FROM shop.invoice
            WHERE ($1::TEXT IS NULL OR kind = $1)
              AND ($2::TEXT IS NULL OR status = $2)
              AND ($3::INTEGER IS NULL OR user_id = $3)
            ",
        )
        .bind(&kind)
        .bind(&status)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        let invoices = rows
            .into_iter()
            .map(InvoiceRow::into_invoice)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((invoices, total))
    }

    /// Get an invoice by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM shop.invoice WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(InvoiceRow::into_invoice).transpose()
    }

    /// Mark an invoice paid. Overdue invoices can still be paid.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the invoice does not exist, and
    /// `RepositoryError::Conflict` if it is already paid.
    pub async fn mark_paid(&self, id: InvoiceId) -> Result<Invoice, RepositoryError> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            r"
            UPDATE shop.invoice
            SET status = 'paid', paid_at = NOW()
            WHERE id = $1 AND status IN ('pending', 'overdue')
            RETURNING {INVOICE_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => row.into_invoice(),
            None => {
                let exists: Option<i32> =
                    sqlx::query_scalar("SELECT id FROM shop.invoice WHERE id = $1")
                        .bind(id.as_i32())
                        .fetch_optional(self.pool)
                        .await?;
                match exists {
                    Some(_) => Err(RepositoryError::Conflict("invoice is already paid".to_owned())),
                    None => Err(RepositoryError::NotFound),
                }
            }
        }
    }

    /// Record that the invoice was emailed to the customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the invoice does not exist.
    pub async fn mark_sent(&self, id: InvoiceId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shop.invoice SET sent_at = NOW() WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Flip every pending invoice past its due date to `overdue`.
    ///
    /// Returns the number of invoices flipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sweep_overdue(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.invoice
            SET status = 'overdue'
            WHERE status = 'pending' AND due_at < NOW()
            ",
        )
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Allocate the next sequence number for a kind in the given month, inside
/// the caller's transaction so the reference and the invoice row commit
/// together.
async fn next_seq(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    kind: CounterKind,
    date: impl chrono::Datelike + Send,
    period: &str,
) -> Result<i32, RepositoryError> {
    let row = sqlx::query_as::<_, SeqRow>(
        r"
        INSERT INTO shop.counter (kind, year, month, period, seq)
        VALUES ($1, $2, $3, $4, 1)
        ON CONFLICT (kind, year, month, period)
        DO UPDATE SET seq = counter.seq + 1
        RETURNING seq
        ",
    )
    .bind(kind.as_str())
    .bind(date.year())
    .bind(i32::try_from(date.month()).unwrap_or(0))
    .bind(period)
    .fetch_one(&mut **tx)
    .await?;

    Ok(row.seq)
}
