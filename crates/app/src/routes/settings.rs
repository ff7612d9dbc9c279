//! Settings page and HFD credential saving.

use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    response::Response,
};
use hfd_shipping_core::{ClientNumber, Credentials};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use crate::error::AppError;
use crate::services::OrderFetcher;
use crate::shopify::{Order, is_valid_shop_domain};
use crate::state::AppState;

use super::{filled, render, require_shop};

/// How many unfulfilled orders the settings page lists.
const ORDER_LIST_LIMIT: u8 = 50;

/// Characters of the HFD token shown back after saving.
const TOKEN_PREVIEW_CHARS: usize = 6;

// =============================================================================
// Templates
// =============================================================================

/// Settings page with the unfulfilled order list.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub shop: String,
    /// Shopify OAuth completed for this shop.
    pub connected: bool,
    /// HFD credentials saved for this shop.
    pub configured: bool,
    pub client_number: String,
    pub sender_name: String,
    pub sender_phone: String,
    pub orders: Vec<OrderRow>,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

/// One row of the order list.
pub struct OrderRow {
    pub id: String,
    pub name: String,
    pub customer: String,
    pub city: String,
    pub created_at: String,
    pub total: String,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        let receiver = order.receiver();
        Self {
            id: order.id.to_string(),
            name: order.name.clone(),
            customer: receiver.name,
            city: receiver.city,
            created_at: order
                .created_at
                .as_deref()
                .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            total: match (&order.total_price, &order.currency) {
                (Some(price), Some(currency)) => format!("{price} {currency}"),
                (Some(price), None) => price.clone(),
                _ => String::new(),
            },
        }
    }
}

/// Confirmation page after saving settings.
#[derive(Template)]
#[template(path = "settings_saved.html")]
pub struct SettingsSavedTemplate {
    pub shop: String,
    pub token_preview: String,
    pub client_number: String,
    pub sender_name: Option<String>,
    pub sender_phone: Option<String>,
}

// =============================================================================
// Query / Form Parameters
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct IndexQueryParams {
    pub shop: Option<String>,
    pub success: Option<String>,
    pub error: Option<String>,
}

/// `POST /save-settings` body.
#[derive(Deserialize)]
pub struct SettingsForm {
    pub shop: String,
    pub hfd_token: String,
    pub client_id: String,
    pub sender_name: Option<String>,
    pub sender_phone: Option<String>,
}

impl std::fmt::Debug for SettingsForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsForm")
            .field("shop", &self.shop)
            .field("hfd_token", &"[REDACTED]")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Route Handlers
// =============================================================================

/// GET / - Settings form and unfulfilled orders.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<IndexQueryParams>,
) -> Response {
    let shop = params
        .shop
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let invalid_shop = !shop.is_empty() && !is_valid_shop_domain(&shop);

    let success_message = params.success.as_deref().map(|s| match s {
        "connected" => "Connected to Shopify.".to_string(),
        _ => format!("Success: {s}"),
    });

    let error_message = params
        .error
        .as_deref()
        .or_else(|| invalid_shop.then_some("invalid_shop"))
        .map(|e| match e {
            "invalid_shop" => "Enter a valid <name>.myshopify.com domain.".to_string(),
            "oauth_denied" => "Shopify authorization was denied.".to_string(),
            "oauth_invalid_hmac" => "Invalid security signature. Please try again.".to_string(),
            "oauth_invalid_state" => "Invalid state parameter. Please try again.".to_string(),
            "oauth_failed" => "OAuth flow failed. Please try again.".to_string(),
            "oauth_exchange_failed" => "Failed to exchange authorization code.".to_string(),
            "oauth_save_failed" => "Failed to save the Shopify session.".to_string(),
            _ => format!("Error: {e}"),
        });

    let mut template = IndexTemplate {
        shop: shop.clone(),
        connected: false,
        configured: false,
        client_number: String::new(),
        sender_name: String::new(),
        sender_phone: String::new(),
        orders: Vec::new(),
        success_message,
        error_message,
    };

    if shop.is_empty() || invalid_shop {
        return render(&template);
    }

    match state.store().get(&shop).await {
        Ok(Some(credentials)) => {
            template.configured = true;
            template.client_number = credentials
                .client_number
                .map(|n| n.to_string())
                .unwrap_or_default();
            template.sender_name = credentials.sender_name.unwrap_or_default();
            template.sender_phone = credentials.sender_phone.unwrap_or_default();
        }
        Ok(None) => {}
        Err(e) => tracing::error!(error = %e, "Failed to load HFD settings"),
    }

    template.connected = matches!(state.store().get_session(&shop).await, Ok(Some(_)));
    if template.connected {
        let fetcher = OrderFetcher::new(state.store(), state.shopify());
        template.orders = fetcher
            .fetch_unfulfilled(&shop, ORDER_LIST_LIMIT)
            .await
            .iter()
            .map(OrderRow::from)
            .collect();
    }

    render(&template)
}

/// POST /save-settings - Save HFD credentials for a shop.
///
/// Replaces whatever was stored for the shop before.
#[instrument(skip(state, form), fields(shop = %form.shop))]
pub async fn save(
    State(state): State<AppState>,
    Form(form): Form<SettingsForm>,
) -> Result<Response, AppError> {
    let shop = require_shop(&form.shop)?;

    let token = form.hfd_token.trim();
    if token.is_empty() {
        return Err(AppError::BadRequest("HFD token is required".to_string()));
    }

    let client_number: ClientNumber = form
        .client_id
        .parse()
        .map_err(|e| AppError::BadRequest(format!("Invalid HFD client number: {e}")))?;

    let mut credentials = Credentials::new(SecretString::from(token.to_string()), client_number);
    credentials.sender_name = filled(form.sender_name.as_deref());
    credentials.sender_phone = filled(form.sender_phone.as_deref());

    let template = SettingsSavedTemplate {
        shop: shop.clone(),
        token_preview: mask_token(credentials.courier_token.expose_secret()),
        client_number: client_number.to_string(),
        sender_name: credentials.sender_name.clone(),
        sender_phone: credentials.sender_phone.clone(),
    };

    state.store().put(&shop, credentials).await?;
    tracing::info!(client_number = %client_number, "HFD settings saved");

    Ok(render(&template))
}

/// First few characters of a token followed by a fixed mask.
fn mask_token(token: &str) -> String {
    let preview: String = token.chars().take(TOKEN_PREVIEW_CHARS).collect();
    format!("{preview}••••••")
}
