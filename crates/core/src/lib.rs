//! HFD Shipping Core - Shipment types and courier payload translation.
//!
//! This crate provides the parts of the HFD Shipping app that carry real
//! decisions:
//! - `types` - Credentials, receivers, and shipment requests
//! - `payload` - Address splitting, validation, and the canonical HFD payload
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. The `app` crate performs the network calls around it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod payload;
pub mod types;

pub use payload::{
    AddressParts, CourierPayload, ShipmentValidationError, split_address, translate,
};
pub use types::*;
