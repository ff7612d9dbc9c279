//! HFD courier shipment API client.
//!
//! One call: `POST /rest/v2/parcels` with the merchant's bearer token and a
//! [`hfd_shipping_core::CourierPayload`] body. The response is classified
//! into a created shipment or a [`CourierError`]; nothing is retried.

mod client;

use serde::Serialize;
use thiserror::Error;

pub use client::CourierClient;

/// Errors that can occur when opening a shipment with HFD.
#[derive(Debug, Error)]
pub enum CourierError {
    /// HFD could not be reached (DNS, connect, TLS, timeout).
    #[error("could not reach HFD: {0}")]
    Transport(#[from] reqwest::Error),

    /// HFD answered but did not create a shipment. `body` is verbatim.
    #[error("HFD rejected the shipment (HTTP {status}): {body}")]
    Upstream { status: u16, body: String },
}

/// A shipment HFD accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedShipment {
    /// HFD shipment number, used for tracking and labels.
    pub shipment_number: String,
}

/// Extract `shipmentNumber` from an HFD response body.
///
/// HFD sends it as a number in most responses and as a string in some; both
/// are accepted. Missing, empty, and zero mean no shipment was created.
#[must_use]
pub fn parse_shipment_number(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    match value.get("shipmentNumber")? {
        serde_json::Value::String(s) => {
            let s = s.trim();
            (!s.is_empty() && s != "0").then(|| s.to_string())
        }
        serde_json::Value::Number(n) => {
            let id = n.as_u64()?;
            (id > 0).then(|| id.to_string())
        }
        _ => None,
    }
}
