//! Shipment submission against a mock HFD endpoint.

use std::time::{Duration, Instant};

use axum::http::StatusCode;
use hfd_shipping_app::config::CourierConfig;
use hfd_shipping_app::courier::{CourierClient, CourierError};
use hfd_shipping_core::{
    ClientNumber, Credentials, CourierPayload, ReceiverInfo, ShipmentKind, ShipmentRequest,
    translate,
};
use hfd_shipping_integration_tests::{
    mock_courier, mock_slow_courier, parcels_url, unreachable_url,
};
use secrecy::SecretString;

fn client(api_url: String) -> CourierClient {
    CourierClient::new(&CourierConfig { api_url }, Duration::from_secs(5))
        .expect("Failed to build courier client")
}

fn credentials() -> Credentials {
    Credentials::new(
        SecretString::from("hfd-token-1"),
        ClientNumber::new(9841).expect("valid client number"),
    )
}

fn payload() -> CourierPayload {
    let request = ShipmentRequest {
        receiver: ReceiverInfo {
            name: "Dana Levi".to_string(),
            phone: "050-1234567".to_string(),
            address_line: "Herzl 12".to_string(),
            city: "Tel Aviv".to_string(),
            ..ReceiverInfo::default()
        },
        kind: ShipmentKind::Home,
        pickup_point_id: None,
        order_reference: Some("#1001".to_string()),
    };
    translate(&credentials(), &request).expect("valid request")
}

#[tokio::test]
async fn test_string_shipment_number_is_success() {
    let courier = mock_courier(StatusCode::OK, r#"{"shipmentNumber":"123"}"#).await;

    let created = client(parcels_url(&courier))
        .submit(&payload(), &credentials())
        .await
        .expect("shipment should be created");

    assert_eq!(created.shipment_number, "123");
    assert_eq!(courier.hits(), 1);
}

#[tokio::test]
async fn test_numeric_shipment_number_is_success() {
    let courier = mock_courier(StatusCode::OK, r#"{"shipmentNumber":987654,"errorCode":0}"#).await;

    let created = client(parcels_url(&courier))
        .submit(&payload(), &credentials())
        .await
        .expect("shipment should be created");

    assert_eq!(created.shipment_number, "987654");
}

#[tokio::test]
async fn test_request_carries_bearer_token_and_payload() {
    let courier = mock_courier(StatusCode::OK, r#"{"shipmentNumber":"123"}"#).await;

    client(parcels_url(&courier))
        .submit(&payload(), &credentials())
        .await
        .expect("shipment should be created");

    let captured = courier.last_request().await.expect("request captured");
    assert_eq!(captured.authorization.as_deref(), Some("Bearer hfd-token-1"));
    assert_eq!(captured.body["clientNumber"], 9841);
    assert_eq!(captured.body["shipmentTypeCode"], 35);
    assert_eq!(captured.body["nameTo"], "Dana Levi");
    assert_eq!(captured.body["streetName"], "Herzl");
    assert_eq!(captured.body["houseNum"], "12");
    assert_eq!(captured.body["referenceNum1"], "#1001");
}

#[tokio::test]
async fn test_server_error_is_upstream_with_raw_body() {
    let courier = mock_courier(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"bad token"}"#).await;

    let err = client(parcels_url(&courier))
        .submit(&payload(), &credentials())
        .await
        .expect_err("shipment should fail");

    match err {
        CourierError::Upstream { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, r#"{"error":"bad token"}"#);
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
    assert_eq!(courier.hits(), 1, "failures are not retried");
}

#[tokio::test]
async fn test_success_without_shipment_number_is_upstream() {
    let courier = mock_courier(StatusCode::OK, r#"{"shipmentNumber":0,"errorMessage":"x"}"#).await;

    let err = client(parcels_url(&courier))
        .submit(&payload(), &credentials())
        .await
        .expect_err("shipment should fail");

    assert!(matches!(err, CourierError::Upstream { status: 200, .. }));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let err = client(unreachable_url().await)
        .submit(&payload(), &credentials())
        .await
        .expect_err("shipment should fail");

    assert!(matches!(err, CourierError::Transport(_)));
}

#[tokio::test]
async fn test_slow_courier_times_out_as_transport_error() {
    let courier = mock_slow_courier(Duration::from_secs(5)).await;
    let client = CourierClient::new(
        &CourierConfig {
            api_url: parcels_url(&courier),
        },
        Duration::from_millis(300),
    )
    .expect("Failed to build courier client");

    let started = Instant::now();
    let err = client
        .submit(&payload(), &credentials())
        .await
        .expect_err("shipment should time out");

    match err {
        CourierError::Transport(e) => assert!(e.is_timeout(), "expected a timeout, got {e}"),
        other => panic!("expected Transport, got {other:?}"),
    }
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(courier.hits(), 1, "timeouts are not retried");
}
