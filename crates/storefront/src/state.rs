//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::payments::PaymentClient;

/// TTL for cached catalog/content responses.
const READ_CACHE_TTL: Duration = Duration::from_secs(60);

/// Maximum number of cached read responses.
const READ_CACHE_CAPACITY: u64 = 1_000;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    payments: PaymentClient,
    /// Short-TTL cache for published catalog and content reads.
    read_cache: Cache<String, serde_json::Value>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let payments = PaymentClient::new(&config.payment);
        let read_cache = Cache::builder()
            .max_capacity(READ_CACHE_CAPACITY)
            .time_to_live(READ_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                payments,
                read_cache,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the payment gateway client.
    #[must_use]
    pub fn payments(&self) -> &PaymentClient {
        &self.inner.payments
    }

    /// Get a reference to the catalog/content read cache.
    #[must_use]
    pub fn read_cache(&self) -> &Cache<String, serde_json::Value> {
        &self.inner.read_cache
    }
}
