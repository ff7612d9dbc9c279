//! Core types for HFD Shipping.
//!
//! This module provides type-safe wrappers for the storefront-to-courier
//! domain: stored credentials, receivers, and shipment requests.

pub mod credentials;
pub mod shipment;

pub use credentials::{ClientNumber, ClientNumberError, Credentials};
pub use shipment::{ReceiverInfo, ShipmentKind, ShipmentKindError, ShipmentRequest};
