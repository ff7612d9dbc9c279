//! Request-scoped services that sit between routes and external clients.

pub mod orders;
pub mod shipments;

pub use orders::OrderFetcher;
pub use shipments::{ShipmentError, ShipmentService};
