//! Opening a shipment: stored credentials → payload → HFD.

use hfd_shipping_core::{ShipmentRequest, ShipmentValidationError, translate};
use thiserror::Error;
use tracing::instrument;

use crate::courier::{CourierClient, CourierError, CreatedShipment};
use crate::store::{SettingsStore, StoreError};

/// Why a shipment was not created.
#[derive(Debug, Error)]
pub enum ShipmentError {
    /// No HFD settings saved for the shop.
    #[error("HFD settings are not configured for {0}")]
    ConfigurationMissing(String),

    /// The request is incomplete; nothing was sent.
    #[error("Invalid shipment: {0}")]
    Validation(#[from] ShipmentValidationError),

    /// HFD could not be reached or did not create the shipment.
    #[error(transparent)]
    Courier(#[from] CourierError),

    /// Settings could not be read.
    #[error("Settings store error: {0}")]
    Store(#[from] StoreError),
}

/// Creates HFD shipments for a shop.
pub struct ShipmentService<'a> {
    store: &'a dyn SettingsStore,
    courier: &'a CourierClient,
}

impl<'a> ShipmentService<'a> {
    /// Create a new shipment service.
    #[must_use]
    pub const fn new(store: &'a dyn SettingsStore, courier: &'a CourierClient) -> Self {
        Self { store, courier }
    }

    /// Validate `request` against the shop's settings and submit it once.
    ///
    /// # Errors
    ///
    /// Returns `ShipmentError::ConfigurationMissing` or
    /// `ShipmentError::Validation` without contacting HFD, and
    /// `ShipmentError::Courier` if the single submission attempt fails.
    #[instrument(skip(self, request), fields(kind = %request.kind))]
    pub async fn create(
        &self,
        shop: &str,
        request: &ShipmentRequest,
    ) -> Result<CreatedShipment, ShipmentError> {
        let credentials = self
            .store
            .get(shop)
            .await?
            .ok_or_else(|| ShipmentError::ConfigurationMissing(shop.to_string()))?;

        let payload = translate(&credentials, request)?;

        Ok(self.courier.submit(&payload, &credentials).await?)
    }
}
