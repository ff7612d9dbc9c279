//! Shopify OAuth and Admin REST client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use crate::config::ShopifyAppConfig;
use crate::store::PlatformSession;

use super::ShopifyError;
use super::types::{Order, OrderEnvelope, OrdersEnvelope};

/// Shopify caps `limit` on list endpoints at 250.
const MAX_PAGE_SIZE: u8 = 250;

/// Shopify API client shared by every shop this app is installed on.
///
/// The client holds app-level credentials only. Per-shop access tokens are
/// passed in as a [`PlatformSession`].
#[derive(Clone)]
pub struct ShopifyClient {
    inner: Arc<ShopifyClientInner>,
}

struct ShopifyClientInner {
    client: reqwest::Client,
    api_key: String,
    api_secret: SecretString,
    api_version: String,
    scopes: Vec<String>,
    origin_override: Option<String>,
}

/// OAuth token response from Shopify.
#[derive(Debug, Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    #[serde(default)]
    scope: String,
}

impl ShopifyClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ShopifyAppConfig, timeout: Duration) -> Result<Self, ShopifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            inner: Arc::new(ShopifyClientInner {
                client,
                api_key: config.api_key.clone(),
                api_secret: config.api_secret.clone(),
                api_version: config.api_version.clone(),
                scopes: config.scopes.clone(),
                origin_override: config.origin_override.clone(),
            }),
        })
    }

    /// Get the app API secret (for HMAC verification).
    #[must_use]
    pub fn api_secret(&self) -> &str {
        self.inner.api_secret.expose_secret()
    }

    /// Origin that API calls for `shop` go to.
    fn origin(&self, shop: &str) -> String {
        self.inner
            .origin_override
            .clone()
            .unwrap_or_else(|| format!("https://{shop}"))
    }

    // =========================================================================
    // OAuth Flow
    // =========================================================================

    /// Generate the OAuth authorization URL for `shop`.
    #[must_use]
    pub fn authorization_url(&self, shop: &str, redirect_uri: &str, state: &str) -> String {
        let scope = self.inner.scopes.join(",");
        format!(
            "{}/admin/oauth/authorize?client_id={}&scope={}&redirect_uri={}&state={}",
            self.origin(shop),
            urlencoding::encode(&self.inner.api_key),
            urlencoding::encode(&scope),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::OAuth` if Shopify rejects the code.
    /// Returns `ShopifyError::Http` if the HTTP request fails.
    #[instrument(skip(self, code))]
    pub async fn exchange_code(
        &self,
        shop: &str,
        code: &str,
    ) -> Result<PlatformSession, ShopifyError> {
        let url = format!("{}/admin/oauth/access_token", self.origin(shop));

        let params = [
            ("client_id", self.inner.api_key.as_str()),
            ("client_secret", self.inner.api_secret.expose_secret()),
            ("code", code),
        ];

        let response = self.inner.client.post(&url).form(&params).send().await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ShopifyError::OAuth(format!("Token exchange failed: {text}")));
        }

        let token: OAuthTokenResponse = response.json().await?;

        Ok(PlatformSession {
            shop: shop.to_string(),
            access_token: SecretString::from(token.access_token),
            scope: token.scope,
            obtained_at: chrono::Utc::now().timestamp(),
        })
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Get one order by its numeric ID.
    ///
    /// Returns `Ok(None)` if Shopify answers 404.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::InvalidOrderId` for non-numeric IDs, and an
    /// HTTP/API error if the request fails.
    #[instrument(skip(self, session), fields(shop = %session.shop))]
    pub async fn get_order(
        &self,
        session: &PlatformSession,
        order_id: &str,
    ) -> Result<Option<Order>, ShopifyError> {
        if order_id.is_empty() || !order_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(ShopifyError::InvalidOrderId(order_id.to_string()));
        }

        let url = format!(
            "{}/admin/api/{}/orders/{order_id}.json",
            self.origin(&session.shop),
            self.inner.api_version
        );

        let response = self.get(session, &url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let envelope: OrderEnvelope = check_status(response).await?.json().await?;
        Ok(Some(envelope.order))
    }

    /// Get open orders that have not been fulfilled, newest first.
    ///
    /// `limit` is clamped to `1..=250`.
    ///
    /// # Errors
    ///
    /// Returns an HTTP/API error if the request fails.
    #[instrument(skip(self, session), fields(shop = %session.shop))]
    pub async fn get_unfulfilled_orders(
        &self,
        session: &PlatformSession,
        limit: u8,
    ) -> Result<Vec<Order>, ShopifyError> {
        let base = format!(
            "{}/admin/api/{}/orders.json",
            self.origin(&session.shop),
            self.inner.api_version
        );
        let mut url = Url::parse(&base).map_err(|e| ShopifyError::InvalidShop(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("status", "open")
            .append_pair("fulfillment_status", "unfulfilled")
            .append_pair("limit", &limit.clamp(1, MAX_PAGE_SIZE).to_string());

        let response = self.get(session, url.as_str()).await?;
        let envelope: OrdersEnvelope = check_status(response).await?.json().await?;
        Ok(envelope.orders)
    }

    async fn get(&self, session: &PlatformSession, url: &str) -> Result<Response, ShopifyError> {
        Ok(self
            .inner
            .client
            .get(url)
            .header("X-Shopify-Access-Token", session.access_token.expose_secret())
            .header("Accept", "application/json")
            .send()
            .await?)
    }
}

/// Map non-success statuses to errors.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
async fn check_status(response: Response) -> Result<Response, ShopifyError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<f64>().ok())
            .map_or(2, |secs| secs.ceil() as u64);
        return Err(ShopifyError::RateLimited(retry_after));
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ShopifyError::Unauthorized(
            "Invalid or revoked access token".to_string(),
        ));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ShopifyError::Api {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response)
}
