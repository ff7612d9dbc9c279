//! Shopify Admin REST order types.
//!
//! Only the fields needed to prefill a shipment are deserialized; Shopify
//! sends many more and serde ignores them.

use hfd_shipping_core::ReceiverInfo;
use serde::Deserialize;

/// A Shopify order.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub id: u64,
    /// Display name, e.g. `#1001`.
    pub name: String,
    pub order_number: Option<u64>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub note: Option<String>,
    pub created_at: Option<String>,
    pub fulfillment_status: Option<String>,
    pub total_price: Option<String>,
    pub currency: Option<String>,
    pub shipping_address: Option<Address>,
    pub customer: Option<Customer>,
}

/// A mailing address attached to an order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Address {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub name: Option<String>,
    pub company: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
}

/// The customer who placed the order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Customer {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// `GET /orders/{id}.json` body.
#[derive(Debug, Deserialize)]
pub(crate) struct OrderEnvelope {
    pub order: Order,
}

/// `GET /orders.json` body.
#[derive(Debug, Deserialize)]
pub(crate) struct OrdersEnvelope {
    pub orders: Vec<Order>,
}

/// Join first/last name, returning `None` when both are blank.
fn full_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let name = format!("{} {}", first.unwrap_or(""), last.unwrap_or(""))
        .trim()
        .to_string();
    (!name.is_empty()).then_some(name)
}

/// First value that is present and not blank.
fn first_filled<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    values
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(String::from)
}

impl Order {
    /// Name of whoever the order ships to, falling back to the customer.
    #[must_use]
    pub fn customer_name(&self) -> String {
        let shipping = self.shipping_address.as_ref();
        let customer = self.customer.as_ref();

        first_filled([shipping.and_then(|a| a.name.as_deref())])
            .or_else(|| {
                shipping.and_then(|a| full_name(a.first_name.as_deref(), a.last_name.as_deref()))
            })
            .or_else(|| {
                customer.and_then(|c| full_name(c.first_name.as_deref(), c.last_name.as_deref()))
            })
            .unwrap_or_default()
    }

    /// Receiver details used to prefill the shipment form.
    #[must_use]
    pub fn receiver(&self) -> ReceiverInfo {
        let shipping = self.shipping_address.as_ref();
        let customer = self.customer.as_ref();

        let phone = first_filled([
            shipping.and_then(|a| a.phone.as_deref()),
            self.phone.as_deref(),
            customer.and_then(|c| c.phone.as_deref()),
        ])
        .unwrap_or_default();

        let email = first_filled([
            self.email.as_deref(),
            customer.and_then(|c| c.email.as_deref()),
        ]);

        ReceiverInfo {
            name: self.customer_name(),
            phone,
            email,
            address_line: first_filled([shipping.and_then(|a| a.address1.as_deref())])
                .unwrap_or_default(),
            city: first_filled([shipping.and_then(|a| a.city.as_deref())]).unwrap_or_default(),
            building: None,
            apartment: first_filled([shipping.and_then(|a| a.address2.as_deref())]),
            comments: first_filled([self.note.as_deref()]),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order_json() -> serde_json::Value {
        serde_json::json!({
            "id": 5_123_456_789_u64,
            "name": "#1001",
            "order_number": 1001,
            "email": "dana@example.com",
            "phone": null,
            "note": "Leave at the door",
            "created_at": "2026-10-01T10:00:00+03:00",
            "fulfillment_status": null,
            "total_price": "129.90",
            "currency": "ILS",
            "line_items": [{"title": "ignored"}],
            "shipping_address": {
                "first_name": "Dana",
                "last_name": "Levi",
                "name": "Dana Levi",
                "address1": "Herzl 12",
                "address2": "Apt 4",
                "city": "Tel Aviv",
                "zip": "6100000",
                "phone": "050-1234567"
            },
            "customer": {
                "first_name": "Dana",
                "last_name": "Levi",
                "email": "dana@example.com",
                "phone": "+972501234567"
            }
        })
    }

    #[test]
    fn test_order_deserializes_and_ignores_unknown_fields() {
        let order: Order = serde_json::from_value(order_json()).unwrap();
        assert_eq!(order.id, 5_123_456_789);
        assert_eq!(order.name, "#1001");
        assert!(order.fulfillment_status.is_none());
    }

    #[test]
    fn test_receiver_from_shipping_address() {
        let order: Order = serde_json::from_value(order_json()).unwrap();
        let receiver = order.receiver();

        assert_eq!(receiver.name, "Dana Levi");
        assert_eq!(receiver.phone, "050-1234567");
        assert_eq!(receiver.email.as_deref(), Some("dana@example.com"));
        assert_eq!(receiver.address_line, "Herzl 12");
        assert_eq!(receiver.city, "Tel Aviv");
        assert_eq!(receiver.apartment.as_deref(), Some("Apt 4"));
        assert_eq!(receiver.comments.as_deref(), Some("Leave at the door"));
    }

    #[test]
    fn test_receiver_falls_back_to_customer() {
        let mut json = order_json();
        json["shipping_address"] = serde_json::json!({
            "name": " ",
            "phone": "",
            "address1": "Herzl",
            "city": "Haifa"
        });
        let order: Order = serde_json::from_value(json).unwrap();
        let receiver = order.receiver();

        assert_eq!(receiver.name, "Dana Levi");
        assert_eq!(receiver.phone, "+972501234567");
        assert_eq!(receiver.apartment, None);
    }

    #[test]
    fn test_receiver_without_any_address_is_blank() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "#1"
        }))
        .unwrap();
        let receiver = order.receiver();

        assert_eq!(receiver.name, "");
        assert_eq!(receiver.phone, "");
        assert_eq!(receiver.address_line, "");
    }
}
