//! Per-store settings and Shopify sessions.
//!
//! Handlers only see the [`SettingsStore`] trait. The process-local
//! [`InMemorySettingsStore`] is the only backend today; everything it holds is
//! lost on restart, so callers treat a missing entry as "not configured yet".

mod memory;

use async_trait::async_trait;
use hfd_shipping_core::Credentials;
use secrecy::SecretString;
use thiserror::Error;

pub use memory::InMemorySettingsStore;

/// Errors that can occur in a settings store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing storage could not be reached or returned an error.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A Shopify OAuth session for one store.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct PlatformSession {
    /// Shop domain (e.g., your-store.myshopify.com).
    pub shop: String,
    /// Admin API access token.
    pub access_token: SecretString,
    /// Granted scopes, comma-separated as returned by Shopify.
    pub scope: String,
    /// Unix timestamp when the token was obtained.
    pub obtained_at: i64,
}

impl std::fmt::Debug for PlatformSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformSession")
            .field("shop", &self.shop)
            .field("access_token", &"[REDACTED]")
            .field("scope", &self.scope)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

/// Storage for courier credentials and Shopify sessions, keyed by shop domain.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Replace the credentials saved for `shop`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend fails.
    async fn put(&self, shop: &str, credentials: Credentials) -> Result<(), StoreError>;

    /// Credentials saved for `shop`, or `None` if it was never configured.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend fails.
    async fn get(&self, shop: &str) -> Result<Option<Credentials>, StoreError>;

    /// Replace the Shopify session for `shop`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend fails.
    async fn put_session(&self, shop: &str, session: PlatformSession) -> Result<(), StoreError>;

    /// Shopify session for `shop`, or `None` before OAuth completed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend fails.
    async fn get_session(&self, shop: &str) -> Result<Option<PlatformSession>, StoreError>;
}
