//! Shopify OAuth install routes.
//!
//! `/auth` stores a random `state` nonce in the session and sends the
//! merchant to Shopify. `/auth/callback` checks the signature and the nonce,
//! exchanges the code and saves the resulting session for the shop.

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tower_sessions::Session;
use tracing::instrument;

use crate::shopify::is_valid_shop_domain;
use crate::state::AppState;

const OAUTH_STATE_KEY: &str = "shopify_oauth_state";

// =============================================================================
// Query Parameters
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    pub shop: Option<String>,
}

// =============================================================================
// HMAC Verification
// =============================================================================

type HmacSha256 = Hmac<Sha256>;

/// Verify the HMAC Shopify adds to the callback query string.
///
/// The message is every parameter except `hmac` and `signature`, sorted by
/// key and joined as `k=v` pairs with `&`.
#[must_use]
pub fn verify_callback_hmac(params: &BTreeMap<String, String>, api_secret: &str) -> bool {
    let Some(provided) = params.get("hmac") else {
        return false;
    };
    let Ok(provided) = hex::decode(provided) else {
        return false;
    };

    let message = params
        .iter()
        .filter(|(k, _)| k.as_str() != "hmac" && k.as_str() != "signature")
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let Ok(mut mac) = HmacSha256::new_from_slice(api_secret.as_bytes()) else {
        return false;
    };
    mac.update(message.as_bytes());

    // Constant-time comparison
    mac.verify_slice(&provided).is_ok()
}

fn settings_redirect(shop: Option<&str>, error: &str) -> Response {
    let to = match shop {
        Some(shop) if is_valid_shop_domain(shop) => {
            format!("/?shop={}&error={error}", urlencoding::encode(shop))
        }
        _ => format!("/?error={error}"),
    };
    Redirect::to(&to).into_response()
}

// =============================================================================
// Route Handlers
// =============================================================================

/// GET /auth - Start the OAuth flow for a shop.
#[instrument(skip(state, session))]
pub async fn connect(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ConnectParams>,
) -> Response {
    let shop = params.shop.as_deref().map(str::trim).unwrap_or_default();
    if !is_valid_shop_domain(shop) {
        tracing::warn!(shop, "Rejected OAuth start for invalid shop domain");
        return settings_redirect(None, "invalid_shop");
    }

    // Random state parameter for CSRF protection
    let oauth_state = uuid::Uuid::new_v4().to_string();

    if let Err(e) = session.insert(OAUTH_STATE_KEY, &oauth_state).await {
        tracing::error!("Failed to store OAuth state: {}", e);
        return settings_redirect(Some(shop), "oauth_failed");
    }

    let auth_url = state.shopify().authorization_url(
        shop,
        &state.config().oauth_redirect_uri(),
        &oauth_state,
    );

    tracing::info!(shop, "Redirecting to Shopify OAuth");
    Redirect::to(&auth_url).into_response()
}

/// GET /auth/callback - Handle the OAuth callback.
#[instrument(skip_all)]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<BTreeMap<String, String>>,
) -> Response {
    let shop = params.get("shop").map(String::as_str);

    if let Some(error) = params.get("error") {
        let description = params
            .get("error_description")
            .map(String::as_str)
            .unwrap_or_default();
        tracing::warn!("Shopify OAuth error: {} - {}", error, description);
        return settings_redirect(shop, "oauth_denied");
    }

    if !verify_callback_hmac(&params, state.shopify().api_secret()) {
        tracing::error!("Invalid HMAC signature in OAuth callback");
        return settings_redirect(shop, "oauth_invalid_hmac");
    }

    let stored_state: Option<String> = session.get(OAUTH_STATE_KEY).await.ok().flatten();
    if stored_state.is_none() || stored_state.as_ref() != params.get("state") {
        tracing::error!("OAuth state mismatch");
        return settings_redirect(shop, "oauth_invalid_state");
    }
    if let Err(e) = session.remove::<String>(OAUTH_STATE_KEY).await {
        tracing::warn!("Failed to clear OAuth state: {}", e);
    }

    let Some(shop) = shop.filter(|s| is_valid_shop_domain(s)) else {
        tracing::error!("Invalid shop domain in OAuth callback");
        return settings_redirect(None, "invalid_shop");
    };

    let Some(code) = params.get("code") else {
        tracing::error!("Missing authorization code in callback");
        return settings_redirect(Some(shop), "oauth_failed");
    };

    let platform_session = match state.shopify().exchange_code(shop, code).await {
        Ok(platform_session) => platform_session,
        Err(e) => {
            tracing::error!("Failed to exchange OAuth code: {}", e);
            return settings_redirect(Some(shop), "oauth_exchange_failed");
        }
    };

    if let Err(e) = state.store().put_session(shop, platform_session).await {
        tracing::error!("Failed to save Shopify session: {}", e);
        return settings_redirect(Some(shop), "oauth_save_failed");
    }

    tracing::info!("Connected to Shopify store: {}", shop);
    Redirect::to(&format!(
        "/?shop={}&success=connected",
        urlencoding::encode(shop)
    ))
    .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "3f9a1c7e5b2d8046af1e9c3b7d5a2f68";

    fn sign(params: &BTreeMap<String, String>) -> String {
        let message = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn callback_params() -> BTreeMap<String, String> {
        [
            ("code", "0907a61c0c8d55e99db179b68161bc00"),
            ("shop", "demo.myshopify.com"),
            ("state", "nonce-1"),
            ("timestamp", "1337178173"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_valid_hmac_is_accepted() {
        let mut params = callback_params();
        let hmac = sign(&params);
        params.insert("hmac".to_string(), hmac);

        assert!(verify_callback_hmac(&params, SECRET));
    }

    #[test]
    fn test_tampered_param_is_rejected() {
        let mut params = callback_params();
        let hmac = sign(&params);
        params.insert("hmac".to_string(), hmac);
        params.insert("shop".to_string(), "evil.myshopify.com".to_string());

        assert!(!verify_callback_hmac(&params, SECRET));
    }

    #[test]
    fn test_signature_param_is_excluded() {
        let mut params = callback_params();
        let hmac = sign(&params);
        params.insert("hmac".to_string(), hmac);
        params.insert("signature".to_string(), "legacy".to_string());

        assert!(verify_callback_hmac(&params, SECRET));
    }

    #[test]
    fn test_missing_or_malformed_hmac_is_rejected() {
        let mut params = callback_params();
        assert!(!verify_callback_hmac(&params, SECRET));

        params.insert("hmac".to_string(), "not-hex".to_string());
        assert!(!verify_callback_hmac(&params, SECRET));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let mut params = callback_params();
        let hmac = sign(&params);
        params.insert("hmac".to_string(), hmac);

        assert!(!verify_callback_hmac(&params, "another-secret-value-entirely"));
    }
}
