//! Validation errors raised before a payload is built.

use thiserror::Error;

/// A shipment request that must not be sent to the courier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShipmentValidationError {
    #[error("receiver name is required")]
    MissingReceiverName,

    #[error("receiver phone is required")]
    MissingReceiverPhone,

    #[error("HFD client number is not configured for this store")]
    MissingClientNumber,
}
