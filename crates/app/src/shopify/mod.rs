//! Shopify Admin API client (OAuth + orders).
//!
//! # Architecture
//!
//! - OAuth authorization-code flow per shop; tokens live in the settings store
//! - Orders are read through the Admin REST API with `X-Shopify-Access-Token`
//! - Read-only: the app never writes back to Shopify
//!
//! # Example
//!
//! ```rust,ignore
//! use hfd_shipping_app::shopify::ShopifyClient;
//!
//! let client = ShopifyClient::new(&config.shopify, config.http_timeout)?;
//!
//! let session = client.exchange_code("my-shop.myshopify.com", &code).await?;
//! let orders = client.get_unfulfilled_orders(&session, 50).await?;
//! ```

mod client;
pub mod types;

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

pub use client::ShopifyClient;
pub use types::{Address, Customer, Order};

/// `<name>.myshopify.com`, the only shop domains OAuth is started for.
static SHOP_DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9\-]*\.myshopify\.com$").expect("Invalid regex")
});

/// Errors that can occur when interacting with Shopify.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed (connect, DNS, timeout, body decoding).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Shopify answered with an unexpected status.
    #[error("Shopify returned {status}: {body}")]
    Api { status: u16, body: String },

    /// OAuth token exchange was rejected.
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Shop domain is not a `*.myshopify.com` domain.
    #[error("Invalid shop domain: {0}")]
    InvalidShop(String),

    /// Order ID is not a numeric Shopify ID.
    #[error("Invalid order id: {0}")]
    InvalidOrderId(String),
}

/// Check that `shop` looks like `your-store.myshopify.com`.
#[must_use]
pub fn is_valid_shop_domain(shop: &str) -> bool {
    SHOP_DOMAIN_RE.is_match(shop)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_shop_domains() {
        assert!(is_valid_shop_domain("tel-aviv-goods.myshopify.com"));
        assert!(is_valid_shop_domain("shop1.myshopify.com"));
    }

    #[test]
    fn test_invalid_shop_domains() {
        assert!(!is_valid_shop_domain(""));
        assert!(!is_valid_shop_domain("evil.com"));
        assert!(!is_valid_shop_domain("shop.myshopify.com.evil.com"));
        assert!(!is_valid_shop_domain("-shop.myshopify.com"));
        assert!(!is_valid_shop_domain("shop.myshopify.com/admin"));
    }

    #[test]
    fn test_shopify_error_display() {
        let err = ShopifyError::Api {
            status: 404,
            body: "Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "Shopify returned 404: Not Found");

        let err = ShopifyError::RateLimited(2);
        assert_eq!(err.to_string(), "Rate limited, retry after 2 seconds");
    }
}
