//! Application state shared across admin handlers.
//!
//! The admin binary holds two pools: its own database (admin users and
//! sessions) and the shop database it manages.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::assets::AssetClient;
use crate::services::email::EmailService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    admin_pool: PgPool,
    shop_pool: PgPool,
    email: EmailService,
    assets: Option<AssetClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP transport cannot be constructed.
    pub fn new(
        config: AdminConfig,
        admin_pool: PgPool,
        shop_pool: PgPool,
    ) -> Result<Self, lettre::transport::smtp::Error> {
        let email = EmailService::new(&config.email)?;
        let assets = config.assets.as_ref().map(AssetClient::new);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                admin_pool,
                shop_pool,
                email,
                assets,
            }),
        })
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the admin database pool (admin users, sessions).
    #[must_use]
    pub fn admin_pool(&self) -> &PgPool {
        &self.inner.admin_pool
    }

    /// Get a reference to the shop database pool (commerce data).
    #[must_use]
    pub fn shop_pool(&self) -> &PgPool {
        &self.inner.shop_pool
    }

    /// Get a reference to the email service.
    #[must_use]
    pub fn email(&self) -> &EmailService {
        &self.inner.email
    }

    /// Get the asset host client, if configured.
    #[must_use]
    pub fn assets(&self) -> Option<&AssetClient> {
        self.inner.assets.as_ref()
    }
}
