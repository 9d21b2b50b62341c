//! Per-month reference-number counters.
//!
//! Each counter row is keyed by `(kind, year, month, period)` and holds the
//! highest sequence number issued so far. Allocation is a single atomic
//! upsert so concurrent checkouts can never receive the same number.

use chrono::Datelike;
use sqlx::PgPool;

use jademart_core::reference::CounterKind;

use super::RepositoryError;

/// Repository for reference-number counters.
pub struct CounterRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct SeqRow {
    seq: i32,
}

impl<'a> CounterRepository<'a> {
    /// Create a new counter repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Allocate the next sequence number for a kind in the given month.
    ///
    /// `period` distinguishes sub-sequences within one month (period
    /// invoices use `"{cycle}-{day}"`; orders and one-time invoices pass
    /// the empty string).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn next_seq(
        &self,
        kind: CounterKind,
        date: impl Datelike + Send,
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
        .fetch_one(self.pool)
        .await?;

        Ok(row.seq)
    }

    /// Allocate sequence numbers inside an existing transaction.
    ///
    /// Used by checkout so the reference number and the order row commit
    /// or roll back together.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn next_seq_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        kind: CounterKind,
        date: impl Datelike + Send,
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
}
