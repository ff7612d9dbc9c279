//! Receiver and shipment request types.
//!
//! These are transient: built from a Shopify order or from the shipment form
//! and dropped once the request that created them finishes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Who receives the parcel and where.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverInfo {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    /// Street and house number as one line, e.g. `Herzl 12`.
    pub address_line: String,
    pub city: String,
    /// Explicit house number, used when `address_line` carries none.
    pub building: Option<String>,
    pub apartment: Option<String>,
    pub comments: Option<String>,
}

/// Delivery mode requested from the courier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentKind {
    /// Door-to-door delivery.
    #[default]
    Home,
    /// Delivery to a pick-up / drop-off point.
    PickupPoint,
}

/// Error parsing a delivery mode from a form value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShipmentKindError {
    #[error("unknown shipment kind '{0}'")]
    Unknown(String),
}

impl ShipmentKind {
    /// Form value for this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::PickupPoint => "pickup_point",
        }
    }
}

impl fmt::Display for ShipmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipmentKind {
    type Err = ShipmentKindError;

    /// An empty value is a home delivery.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "home" => Ok(Self::Home),
            "pickup_point" | "pickup" | "pudo" => Ok(Self::PickupPoint),
            other => Err(ShipmentKindError::Unknown(other.to_string())),
        }
    }
}

/// A request to open one shipment with the courier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShipmentRequest {
    pub receiver: ReceiverInfo,
    pub kind: ShipmentKind,
    /// Raw pickup point code as typed into the form.
    pub pickup_point_id: Option<String>,
    /// Storefront order number (e.g. `#1001`), sent for reconciliation.
    pub order_reference: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipment_kind_from_form_value() {
        assert_eq!(
            "pickup_point".parse::<ShipmentKind>(),
            Ok(ShipmentKind::PickupPoint)
        );
        assert_eq!("home".parse::<ShipmentKind>(), Ok(ShipmentKind::Home));
        assert_eq!("".parse::<ShipmentKind>(), Ok(ShipmentKind::Home));
        assert_eq!(" pudo ".parse::<ShipmentKind>(), Ok(ShipmentKind::PickupPoint));
    }

    #[test]
    fn test_unknown_shipment_kind_is_rejected() {
        assert_eq!(
            "pickup-point".parse::<ShipmentKind>(),
            Err(ShipmentKindError::Unknown("pickup-point".to_string()))
        );
        assert!("express".parse::<ShipmentKind>().is_err());
    }

    #[test]
    fn test_shipment_kind_round_trips_display() {
        for kind in [ShipmentKind::Home, ShipmentKind::PickupPoint] {
            assert_eq!(kind.to_string().parse::<ShipmentKind>(), Ok(kind));
        }
    }
}
