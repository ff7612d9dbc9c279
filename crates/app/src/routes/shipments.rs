//! Shipment form and submission.

use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hfd_shipping_core::{ReceiverInfo, ShipmentKind, ShipmentKindError, ShipmentRequest};
use serde::Deserialize;
use tracing::instrument;

use crate::error::AppError;
use crate::services::{OrderFetcher, ShipmentError, ShipmentService};
use crate::state::AppState;

use super::{filled, render, require_shop};

// =============================================================================
// Templates
// =============================================================================

/// Shipment form, prefilled from an order when one could be fetched.
#[derive(Template)]
#[template(path = "shipment_form.html")]
pub struct ShipmentFormTemplate {
    pub shop: String,
    pub order_id: String,
    pub order_reference: String,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub receiver_email: String,
    pub address_line: String,
    pub city: String,
    pub building: String,
    pub apartment: String,
    pub comments: String,
    /// `home` or `pickup_point`
    pub shipment_kind: String,
    pub pickup_point_id: String,
    /// HFD credentials are saved for the shop.
    pub configured: bool,
    pub notice: Option<String>,
    pub error_message: Option<String>,
}

impl ShipmentFormTemplate {
    fn new(shop: &str, order_id: &str, order_reference: &str, receiver: ReceiverInfo) -> Self {
        Self {
            shop: shop.to_string(),
            order_id: order_id.to_string(),
            order_reference: order_reference.to_string(),
            receiver_name: receiver.name,
            receiver_phone: receiver.phone,
            receiver_email: receiver.email.unwrap_or_default(),
            address_line: receiver.address_line,
            city: receiver.city,
            building: receiver.building.unwrap_or_default(),
            apartment: receiver.apartment.unwrap_or_default(),
            comments: receiver.comments.unwrap_or_default(),
            shipment_kind: ShipmentKind::Home.as_str().to_string(),
            pickup_point_id: String::new(),
            configured: true,
            notice: None,
            error_message: None,
        }
    }
}

/// Result page for a created shipment.
#[derive(Template)]
#[template(path = "shipment_result.html")]
pub struct ShipmentResultTemplate {
    pub shop: String,
    pub shipment_number: String,
    pub order_reference: String,
    pub receiver_name: String,
    pub shipment_kind: String,
}

// =============================================================================
// Query / Form Parameters
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SendToHfdParams {
    pub id: Option<String>,
    pub shop: Option<String>,
}

/// `POST /create-shipment` body.
///
/// Required text fields default to empty so a missing field surfaces as a
/// validation message on the form.
#[derive(Debug, Deserialize)]
pub struct ShipmentForm {
    pub shop: String,
    pub order_id: Option<String>,
    pub order_reference: Option<String>,
    #[serde(default)]
    pub receiver_name: String,
    #[serde(default)]
    pub receiver_phone: String,
    pub receiver_email: Option<String>,
    #[serde(default)]
    pub address_line: String,
    #[serde(default)]
    pub city: String,
    pub building: Option<String>,
    pub apartment: Option<String>,
    pub comments: Option<String>,
    pub shipment_kind: Option<String>,
    pub pickup_point_id: Option<String>,
}

impl ShipmentForm {
    /// The shipment request this form describes.
    ///
    /// # Errors
    ///
    /// Returns `ShipmentKindError` if `shipment_kind` is not a known mode.
    pub fn to_request(&self) -> Result<ShipmentRequest, ShipmentKindError> {
        let kind = self
            .shipment_kind
            .as_deref()
            .unwrap_or_default()
            .parse()?;

        Ok(ShipmentRequest {
            receiver: ReceiverInfo {
                name: self.receiver_name.trim().to_string(),
                phone: self.receiver_phone.trim().to_string(),
                email: filled(self.receiver_email.as_deref()),
                address_line: self.address_line.trim().to_string(),
                city: self.city.trim().to_string(),
                building: filled(self.building.as_deref()),
                apartment: filled(self.apartment.as_deref()),
                comments: filled(self.comments.as_deref()),
            },
            kind,
            pickup_point_id: filled(self.pickup_point_id.as_deref()),
            order_reference: filled(self.order_reference.as_deref()),
        })
    }
}

// =============================================================================
// Route Handlers
// =============================================================================

/// GET /send_to_hfd - Shipment form for one order.
///
/// Renders blank fields when the order cannot be fetched.
#[instrument(skip(state))]
pub async fn form(
    State(state): State<AppState>,
    Query(params): Query<SendToHfdParams>,
) -> Result<Response, AppError> {
    let shop = require_shop(params.shop.as_deref().unwrap_or_default())?;
    let order_id = params.id.as_deref().map(str::trim).unwrap_or_default();

    let configured = state.store().get(&shop).await?.is_some();

    let order = if order_id.is_empty() {
        None
    } else {
        OrderFetcher::new(state.store(), state.shopify())
            .fetch_order(&shop, order_id)
            .await
    };

    let mut template = match &order {
        Some(order) => ShipmentFormTemplate::new(&shop, order_id, &order.name, order.receiver()),
        None => ShipmentFormTemplate::new(&shop, order_id, "", ReceiverInfo::default()),
    };
    template.configured = configured;
    if order.is_none() && !order_id.is_empty() {
        template.notice = Some(format!(
            "Order {order_id} could not be loaded from Shopify. Fill in the details manually."
        ));
    }

    Ok(render(&template))
}

/// POST /create-shipment - Create the shipment with HFD.
#[instrument(skip(state, form), fields(shop = %form.shop))]
pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<ShipmentForm>,
) -> Result<Response, AppError> {
    let shop = require_shop(&form.shop)?;
    let request = form
        .to_request()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let service = ShipmentService::new(state.store(), state.courier());
    match service.create(&shop, &request).await {
        Ok(created) => {
            tracing::info!(
                shipment_number = %created.shipment_number,
                order_reference = request.order_reference.as_deref().unwrap_or_default(),
                "HFD shipment created"
            );

            Ok(render(&ShipmentResultTemplate {
                shop,
                shipment_number: created.shipment_number,
                order_reference: request.order_reference.unwrap_or_default(),
                receiver_name: request.receiver.name,
                shipment_kind: request.kind.as_str().to_string(),
            }))
        }
        Err(ShipmentError::Validation(e)) => {
            let mut template = ShipmentFormTemplate::new(
                &shop,
                form.order_id.as_deref().unwrap_or_default(),
                request.order_reference.as_deref().unwrap_or_default(),
                request.receiver,
            );
            template.shipment_kind = request.kind.as_str().to_string();
            template.pickup_point_id = request.pickup_point_id.unwrap_or_default();
            template.error_message = Some(e.to_string());

            Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&template)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
