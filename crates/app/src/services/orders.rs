//! Order lookups for the settings page and the shipment form.
//!
//! Both pages still render when Shopify is unreachable, so every failure is
//! logged and turned into "no order" / "no orders" here.

use tracing::instrument;

use crate::shopify::{Order, ShopifyClient};
use crate::store::{PlatformSession, SettingsStore};

/// Reads orders for a shop using the session saved during OAuth.
pub struct OrderFetcher<'a> {
    store: &'a dyn SettingsStore,
    shopify: &'a ShopifyClient,
}

impl<'a> OrderFetcher<'a> {
    /// Create a new order fetcher.
    #[must_use]
    pub const fn new(store: &'a dyn SettingsStore, shopify: &'a ShopifyClient) -> Self {
        Self { store, shopify }
    }

    /// One order, or `None` if it cannot be fetched for any reason.
    #[instrument(skip(self))]
    pub async fn fetch_order(&self, shop: &str, order_id: &str) -> Option<Order> {
        let session = self.session(shop).await?;

        match self.shopify.get_order(&session, order_id).await {
            Ok(Some(order)) => Some(order),
            Ok(None) => {
                tracing::info!("Order not found in Shopify");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch order");
                None
            }
        }
    }

    /// Up to `limit` unfulfilled orders, or an empty list on failure.
    #[instrument(skip(self))]
    pub async fn fetch_unfulfilled(&self, shop: &str, limit: u8) -> Vec<Order> {
        let Some(session) = self.session(shop).await else {
            return Vec::new();
        };

        self.shopify
            .get_unfulfilled_orders(&session, limit)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to fetch unfulfilled orders");
                Vec::new()
            })
    }

    async fn session(&self, shop: &str) -> Option<PlatformSession> {
        match self.store.get_session(shop).await {
            Ok(Some(session)) => Some(session),
            Ok(None) => {
                tracing::debug!("No Shopify session for shop");
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load Shopify session");
                None
            }
        }
    }
}
