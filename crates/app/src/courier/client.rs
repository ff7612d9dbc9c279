//! HTTP client for the HFD shipment endpoint.

use std::sync::Arc;
use std::time::Duration;

use hfd_shipping_core::{CourierPayload, Credentials};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::CourierConfig;

use super::{CourierError, CreatedShipment, parse_shipment_number};

/// HFD courier API client.
#[derive(Clone)]
pub struct CourierClient {
    inner: Arc<CourierClientInner>,
}

struct CourierClientInner {
    client: reqwest::Client,
    api_url: String,
}

impl CourierClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `CourierError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &CourierConfig, timeout: Duration) -> Result<Self, CourierError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            inner: Arc::new(CourierClientInner {
                client,
                api_url: config.api_url.clone(),
            }),
        })
    }

    /// Open a shipment.
    ///
    /// Makes exactly one request.
    ///
    /// # Errors
    ///
    /// Returns `CourierError::Transport` if HFD cannot be reached or the
    /// request times out, and `CourierError::Upstream` with the raw body for
    /// any response that does not carry a shipment number.
    #[instrument(
        skip(self, payload, credentials),
        fields(client_number = payload.client_number, shipment_type = payload.shipment_type_code)
    )]
    pub async fn submit(
        &self,
        payload: &CourierPayload,
        credentials: &Credentials,
    ) -> Result<CreatedShipment, CourierError> {
        let response = self
            .inner
            .client
            .post(&self.inner.api_url)
            .header(
                AUTHORIZATION,
                format!("Bearer {}", credentials.courier_token.expose_secret()),
            )
            .header(ACCEPT, "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success()
            && let Some(shipment_number) = parse_shipment_number(&body)
        {
            tracing::info!(%shipment_number, "HFD shipment created");
            return Ok(CreatedShipment { shipment_number });
        }

        tracing::warn!(status = status.as_u16(), body = %body, "HFD did not create a shipment");
        Err(CourierError::Upstream {
            status: status.as_u16(),
            body,
        })
    }
}
