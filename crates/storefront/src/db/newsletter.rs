//! Newsletter subscriber repository.

use sqlx::PgPool;

use jademart_core::Email;

use super::RepositoryError;

/// Repository for newsletter subscriptions.
pub struct NewsletterRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NewsletterRepository<'a> {
    /// Create a new newsletter repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Subscribe an email address.
    ///
    /// Re-subscribing an existing address reactivates it and keeps its
    /// original unsubscribe token, so already-sent emails stay valid.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn subscribe(
        &self,
        email: &Email,
        unsubscribe_token: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO shop.newsletter_subscriber (email, unsubscribe_token, active)
            VALUES ($1, $2, TRUE)
            ON CONFLICT (email)
            DO UPDATE SET active = TRUE, unsubscribed_at = NULL
            ",
        )
        .bind(email.as_str())
        .bind(unsubscribe_token)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Unsubscribe by token.
    ///
    /// Returns `false` if no subscriber carries the token. Unsubscribing an
    /// already-inactive subscriber is a no-op success.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn unsubscribe_by_token(&self, token: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.newsletter_subscriber
            SET active = FALSE,
                unsubscribed_at = COALESCE(unsubscribed_at, NOW())
            WHERE unsubscribe_token = $1
            ",
        )
        .bind(token)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deactivate a subscriber by email, for provider bounce/complaint
    /// events.
    ///
    /// Returns `false` if the address was never subscribed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn deactivate_by_email(&self, email: &Email) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.newsletter_subscriber
            SET active = FALSE,
                unsubscribed_at = COALESCE(unsubscribed_at, NOW())
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
