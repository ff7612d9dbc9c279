//! Test harness for HFD Shipping.
//!
//! Everything runs in-process: the app router is driven with
//! `tower::ServiceExt::oneshot`, and Shopify and HFD are replaced by small
//! axum servers bound to `127.0.0.1:0`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p hfd-shipping-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, Response, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use hfd_shipping_app::config::{AppConfig, CourierConfig, ShopifyAppConfig};
use hfd_shipping_app::state::AppState;
use hfd_shipping_app::store::{InMemorySettingsStore, PlatformSession};
use hmac::{Hmac, Mac};
use secrecy::SecretString;
use serde_json::{Value, json};
use sha2::Sha256;
use tokio::sync::Mutex;

/// Shop domain used throughout the tests.
pub const TEST_SHOP: &str = "demo.myshopify.com";
/// Shopify app secret used by the test config.
pub const TEST_API_SECRET: &str = "3f9a1c7e5b2d8046af1e9c3b7d5a2f68";
/// Access token the mock Shopify hands out and accepts.
pub const TEST_ACCESS_TOKEN: &str = "shpat_test_token";
/// Order ID the mock Shopify knows about.
pub const KNOWN_ORDER_ID: &str = "5123";

const PARCELS_PATH: &str = "/rest/v2/parcels";

// =============================================================================
// Mock servers
// =============================================================================

/// A request captured by the mock courier.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

/// An axum server on an ephemeral local port.
pub struct MockServer {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<CapturedRequest>>>,
}

impl MockServer {
    /// `http://127.0.0.1:{port}`
    #[must_use]
    pub fn origin(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of requests the mock has answered.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// The most recent request, if any.
    pub async fn last_request(&self) -> Option<CapturedRequest> {
        self.last_request.lock().await.clone()
    }
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock server");
    let addr = listener.local_addr().expect("Mock server has no address");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Mock server error");
    });

    addr
}

#[derive(Clone)]
struct CourierMockState {
    status: StatusCode,
    body: &'static str,
    delay: Duration,
    hits: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<CapturedRequest>>>,
}

async fn courier_handler(
    State(mock): State<CourierMockState>,
    headers: HeaderMap,
    body: String,
) -> Response<Body> {
    mock.hits.fetch_add(1, Ordering::SeqCst);
    *mock.last_request.lock().await = Some(CapturedRequest {
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    });

    if !mock.delay.is_zero() {
        tokio::time::sleep(mock.delay).await;
    }

    (mock.status, mock.body).into_response()
}

/// A courier that answers every shipment request with `status` and `body`.
pub async fn mock_courier(status: StatusCode, body: &'static str) -> MockServer {
    courier_with_delay(status, body, Duration::ZERO).await
}

/// A courier that creates shipments, but only after `delay`.
pub async fn mock_slow_courier(delay: Duration) -> MockServer {
    courier_with_delay(StatusCode::OK, r#"{"shipmentNumber":"123"}"#, delay).await
}

async fn courier_with_delay(
    status: StatusCode,
    body: &'static str,
    delay: Duration,
) -> MockServer {
    let hits = Arc::new(AtomicUsize::new(0));
    let last_request = Arc::new(Mutex::new(None));

    let router = Router::new()
        .route(PARCELS_PATH, post(courier_handler))
        .with_state(CourierMockState {
            status,
            body,
            delay,
            hits: Arc::clone(&hits),
            last_request: Arc::clone(&last_request),
        });

    MockServer {
        addr: serve(router).await,
        hits,
        last_request,
    }
}

/// Shipment URL on a mock courier.
#[must_use]
pub fn parcels_url(courier: &MockServer) -> String {
    format!("{}{PARCELS_PATH}", courier.origin())
}

/// The order the mock Shopify returns for [`KNOWN_ORDER_ID`].
#[must_use]
pub fn sample_order() -> Value {
    json!({
        "id": 5123,
        "name": "#1001",
        "order_number": 1001,
        "email": "dana@example.com",
        "note": "Leave at the door",
        "created_at": "2026-10-01T10:00:00+03:00",
        "fulfillment_status": null,
        "total_price": "129.90",
        "currency": "ILS",
        "shipping_address": {
            "first_name": "Dana",
            "last_name": "Levi",
            "name": "Dana Levi",
            "address1": "Herzl 12",
            "address2": "4",
            "city": "Tel Aviv",
            "phone": "050-1234567"
        }
    })
}

#[derive(Clone)]
struct ShopifyMockState {
    hits: Arc<AtomicUsize>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("x-shopify-access-token")
        .and_then(|v| v.to_str().ok())
        == Some(TEST_ACCESS_TOKEN)
}

async fn access_token(State(mock): State<ShopifyMockState>, body: String) -> Response<Body> {
    mock.hits.fetch_add(1, Ordering::SeqCst);
    if body.contains("code=good-code") {
        Json(json!({ "access_token": TEST_ACCESS_TOKEN, "scope": "read_orders" })).into_response()
    } else {
        (StatusCode::BAD_REQUEST, r#"{"error":"invalid_request"}"#).into_response()
    }
}

async fn order(
    State(mock): State<ShopifyMockState>,
    Path((_version, file)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response<Body> {
    mock.hits.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if file == format!("{KNOWN_ORDER_ID}.json") {
        Json(json!({ "order": sample_order() })).into_response()
    } else {
        (StatusCode::NOT_FOUND, r#"{"errors":"Not Found"}"#).into_response()
    }
}

async fn orders(State(mock): State<ShopifyMockState>, headers: HeaderMap) -> Response<Body> {
    mock.hits.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({ "orders": [sample_order()] })).into_response()
}

/// A Shopify that accepts code `good-code` and serves [`sample_order`].
pub async fn mock_shopify() -> MockServer {
    let hits = Arc::new(AtomicUsize::new(0));

    let router = Router::new()
        .route("/admin/oauth/access_token", post(access_token))
        .route("/admin/api/{version}/orders.json", get(orders))
        .route("/admin/api/{version}/orders/{file}", get(order))
        .with_state(ShopifyMockState {
            hits: Arc::clone(&hits),
        });

    MockServer {
        addr: serve(router).await,
        hits,
        last_request: Arc::new(Mutex::new(None)),
    }
}

/// A URL nothing is listening on.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    drop(listener);
    format!("http://{addr}{PARCELS_PATH}")
}

// =============================================================================
// App setup
// =============================================================================

/// Config pointing Shopify and HFD at the given URLs.
#[must_use]
pub fn test_config(shopify_origin: Option<String>, courier_url: String) -> AppConfig {
    AppConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        shopify: ShopifyAppConfig {
            api_key: "test-api-key".to_string(),
            api_secret: SecretString::from(TEST_API_SECRET),
            api_version: "2025-01".to_string(),
            scopes: vec!["read_orders".to_string()],
            origin_override: shopify_origin,
        },
        courier: CourierConfig {
            api_url: courier_url,
        },
        http_timeout: Duration::from_secs(5),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// App state backed by a fresh in-memory store.
#[must_use]
pub fn test_state(config: AppConfig) -> AppState {
    AppState::new(config, Arc::new(InMemorySettingsStore::new()))
        .expect("Failed to create application state")
}

/// Save a Shopify session for [`TEST_SHOP`] without going through OAuth.
pub async fn connect_shop(state: &AppState) {
    state
        .store()
        .put_session(
            TEST_SHOP,
            PlatformSession {
                shop: TEST_SHOP.to_string(),
                access_token: SecretString::from(TEST_ACCESS_TOKEN),
                scope: "read_orders".to_string(),
                obtained_at: 0,
            },
        )
        .await
        .expect("Failed to save session");
}

// =============================================================================
// Request helpers
// =============================================================================

/// Sign OAuth callback parameters the way Shopify does.
#[must_use]
pub fn sign_callback(params: &BTreeMap<String, String>, secret: &str) -> String {
    let message = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// `application/x-www-form-urlencoded` body from pairs.
#[must_use]
pub fn form_body(pairs: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Collect a response body as a string.
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}
