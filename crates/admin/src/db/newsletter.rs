//! Newsletter subscriber repository (shop database).

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use jademart_core::SubscriberId;

use super::RepositoryError;
use crate::models::newsletter::Subscriber;

/// Repository for newsletter subscribers.
pub struct NewsletterRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct SubscriberRow {
    id: i32,
    email: String,
    active: bool,
    subscribed_at: DateTime<Utc>,
    unsubscribed_at: Option<DateTime<Utc>>,
}

impl SubscriberRow {
    fn into_subscriber(self) -> Subscriber {
        Subscriber {
            id: SubscriberId::new(self.id),
            email: self.email,
            active: self.active,
            subscribed_at: self.subscribed_at,
            unsubscribed_at: self.unsubscribed_at,
        }
    }
}

const SUBSCRIBER_COLUMNS: &str = "id, email, active, subscribed_at, unsubscribed_at";

impl<'a> NewsletterRepository<'a> {
    /// Create a new newsletter repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List subscribers, newest first, plus the total count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        active_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Subscriber>, i64), RepositoryError> {
        let rows = sqlx::query_as::<_, SubscriberRow>(&format!(
            r"
            SELECT {SUBSCRIBER_COLUMNS}
            FROM shop.newsletter_subscriber
            WHERE ($1 = FALSE OR active)
            ORDER BY subscribed_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "
        ))
        .bind(active_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM shop.newsletter_subscriber WHERE ($1 = FALSE OR active)",
        )
        .bind(active_only)
        .fetch_one(self.pool)
        .await?;

        Ok((
            rows.into_iter().map(SubscriberRow::into_subscriber).collect(),
            total,
        ))
    }

    /// Load every active subscriber, oldest first, for the CSV export.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn export_active(&self) -> Result<Vec<Subscriber>, RepositoryError> {
        let rows = sqlx::query_as::<_, SubscriberRow>(&format!(
            r"
            SELECT {SUBSCRIBER_COLUMNS}
            FROM shop.newsletter_subscriber
            WHERE active
            ORDER BY subscribed_at ASC, id ASC
            "
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(SubscriberRow::into_subscriber).collect())
    }

    /// Deactivate a subscriber by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the subscriber does not exist.
    pub async fn deactivate(&self, id: SubscriberId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.newsletter_subscriber
            SET active = FALSE, unsubscribed_at = NOW()
            WHERE id = $1 AND active
            ",
        )
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
