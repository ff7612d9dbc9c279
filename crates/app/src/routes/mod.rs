//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Settings
//! GET  /                       - Settings form and unfulfilled orders
//! POST /save-settings          - Save HFD token and client number
//!
//! # Shopify OAuth
//! GET  /auth                   - Redirect to Shopify authorize URL
//! GET  /auth/callback          - Exchange code for an access token
//!
//! # Shipments
//! GET  /send_to_hfd            - Shipment form for one order
//! POST /create-shipment        - Create the shipment with HFD
//! ```

pub mod auth;
pub mod settings;
pub mod shipments;

use askama::Template;
use axum::{
    Json, Router,
    http::Request,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};

use crate::error::AppError;
use crate::middleware::create_session_layer;
use crate::shopify::is_valid_shop_domain;
use crate::state::AppState;

/// Create all routes for the app.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/", get(settings::index))
        .route("/save-settings", post(settings::save))
        .route("/auth", get(auth::connect))
        .route("/auth/callback", get(auth::callback))
        .route("/send_to_hfd", get(shipments::form))
        .route("/create-shipment", post(shipments::create))
}

/// The full application: routes, session and request tracing.
///
/// Sentry layers are added by the binary on top of this.
#[allow(clippy::cast_possible_truncation)]
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .merge(routes())
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record("status", response.status().as_u16());
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Trim and validate a `shop` parameter.
pub(crate) fn require_shop(shop: &str) -> Result<String, AppError> {
    let shop = shop.trim();
    if is_valid_shop_domain(shop) {
        Ok(shop.to_string())
    } else {
        Err(AppError::BadRequest(format!(
            "'{shop}' is not a valid <name>.myshopify.com domain"
        )))
    }
}

/// `Some(trimmed)` for a filled form field, `None` for a blank or missing one.
pub(crate) fn filled(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Render a template as an HTML response.
pub(crate) fn render(template: &impl Template) -> Response {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
    .into_response()
}
