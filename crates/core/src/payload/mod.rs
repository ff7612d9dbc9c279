//! Translation of a shipment request into the HFD `parcels` payload.
//!
//! HFD accepted two incompatible JSON shapes over time. This crate emits only
//! the field-name-aligned one (`clientNumber`, `nameTo`, `shipmentTypeCode`,
//! ...), and [`translate`] is the only place that knows about it.
//!
//! Every optional text field is sent as `""`: the courier validates the body
//! against a strict schema and rejects `null` or missing keys.

mod address;
mod error;

use serde::Serialize;

use crate::types::{Credentials, ShipmentKind, ShipmentRequest};

pub use address::{AddressParts, split_address};
pub use error::ShipmentValidationError;

/// `shipmentTypeCode` for door-to-door delivery.
pub const SHIPMENT_TYPE_HOME: u16 = 35;
/// `shipmentTypeCode` for delivery to a pickup point.
pub const SHIPMENT_TYPE_PICKUP_POINT: u16 = 36;
/// `cargoTypeHaloch`: outbound leg carries a package.
pub const CARGO_TYPE_PACKAGE: u16 = 10;
/// `cargoTypeHazor`: no return leg.
pub const CARGO_TYPE_NONE: u16 = 0;

const MESIRA: &str = "מסירה";
const STAGE_CODE_OPEN: u16 = 5;

/// Body of `POST /rest/v2/parcels`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourierPayload {
    pub client_number: i64,
    pub mesira_isuf: &'static str,
    pub shipment_type_code: u16,
    pub stage_code: u16,
    pub orderer_name: String,
    pub cargo_type_haloch: u16,
    pub cargo_type_hazor: u16,
    pub packs_haloch: String,
    pub packs_hazor: u16,
    pub name_to: String,
    pub city_code: String,
    pub city_name: String,
    pub street_code: String,
    pub street_name: String,
    pub house_num: String,
    pub entrance: String,
    pub floor: String,
    pub apartment: String,
    pub tel_first: String,
    pub tel_second: String,
    pub email: String,
    pub reference_num1: String,
    pub reference_num2: String,
    pub future_date: String,
    pub future_time: String,
    pub pudo_code_origin: i64,
    pub pudo_code_destination: i64,
    pub auto_bind_pudo: &'static str,
    pub remarks: String,
}

impl CourierPayload {
    /// The payload as a JSON value, for logging and tests.
    ///
    /// # Errors
    ///
    /// Returns an error only if serialization fails, which the derived
    /// implementation does not do for this type.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Build the courier payload for `request` using the store's `credentials`.
///
/// # Errors
///
/// Returns `ShipmentValidationError` when the client number is unresolved or
/// the receiver name or phone is blank. Nothing is defaulted for these.
pub fn translate(
    credentials: &Credentials,
    request: &ShipmentRequest,
) -> Result<CourierPayload, ShipmentValidationError> {
    let client_number = credentials
        .client_number
        .ok_or(ShipmentValidationError::MissingClientNumber)?;

    let receiver = &request.receiver;
    let name_to = receiver.name.trim();
    if name_to.is_empty() {
        return Err(ShipmentValidationError::MissingReceiverName);
    }
    let tel_first = receiver.phone.trim();
    if tel_first.is_empty() {
        return Err(ShipmentValidationError::MissingReceiverPhone);
    }

    let AddressParts { street, house } = split_address(&receiver.address_line);
    let house_num = if house.is_empty() {
        text(receiver.building.as_deref())
    } else {
        house
    };

    Ok(CourierPayload {
        client_number: client_number.as_i64(),
        mesira_isuf: MESIRA,
        shipment_type_code: shipment_type_code(request.kind),
        stage_code: STAGE_CODE_OPEN,
        orderer_name: text(credentials.sender_name.as_deref()),
        cargo_type_haloch: CARGO_TYPE_PACKAGE,
        cargo_type_hazor: CARGO_TYPE_NONE,
        packs_haloch: "1".to_string(),
        packs_hazor: 0,
        name_to: name_to.to_string(),
        city_code: String::new(),
        city_name: receiver.city.trim().to_string(),
        street_code: String::new(),
        street_name: street,
        house_num,
        entrance: String::new(),
        floor: String::new(),
        apartment: text(receiver.apartment.as_deref()),
        tel_first: tel_first.to_string(),
        tel_second: String::new(),
        email: text(receiver.email.as_deref()),
        reference_num1: text(request.order_reference.as_deref()),
        reference_num2: String::new(),
        future_date: String::new(),
        future_time: String::new(),
        pudo_code_origin: 0,
        pudo_code_destination: pudo_code(request.kind, request.pickup_point_id.as_deref()),
        auto_bind_pudo: "N",
        remarks: text(receiver.comments.as_deref()),
    })
}

/// `shipmentTypeCode` for a delivery kind.
#[must_use]
pub const fn shipment_type_code(kind: ShipmentKind) -> u16 {
    match kind {
        ShipmentKind::Home => SHIPMENT_TYPE_HOME,
        ShipmentKind::PickupPoint => SHIPMENT_TYPE_PICKUP_POINT,
    }
}

/// `pudoCodeDestination`: the pickup point code, or 0.
///
/// Unparseable input becomes 0 rather than an error; the courier then picks
/// the point itself.
#[must_use]
pub fn pudo_code(kind: ShipmentKind, raw: Option<&str>) -> i64 {
    match kind {
        ShipmentKind::Home => 0,
        ShipmentKind::PickupPoint => raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0),
    }
}

fn text(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}
