//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::courier::{CourierClient, CourierError};
use crate::shopify::{ShopifyClient, ShopifyError};
use crate::store::SettingsStore;

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to build Shopify client: {0}")]
    Shopify(#[from] ShopifyError),
    #[error("failed to build HFD client: {0}")]
    Courier(#[from] CourierError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    store: Arc<dyn SettingsStore>,
    shopify: ShopifyClient,
    courier: CourierClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if either HTTP client cannot be built.
    pub fn new(config: AppConfig, store: Arc<dyn SettingsStore>) -> Result<Self, StateError> {
        let shopify = ShopifyClient::new(&config.shopify, config.http_timeout)?;
        let courier = CourierClient::new(&config.courier, config.http_timeout)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                shopify,
                courier,
            }),
        })
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get the settings store.
    #[must_use]
    pub fn store(&self) -> &dyn SettingsStore {
        self.inner.store.as_ref()
    }

    /// Get the Shopify client.
    #[must_use]
    pub fn shopify(&self) -> &ShopifyClient {
        &self.inner.shopify
    }

    /// Get the HFD client.
    #[must_use]
    pub fn courier(&self) -> &CourierClient {
        &self.inner.courier
    }
}
