//! HFD Shipping app library.
//!
//! A Shopify app that lets a merchant save HFD courier credentials, browse
//! unfulfilled orders, and open an HFD shipment for any of them. Exposed as a
//! library so the router can be driven from integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod courier;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;
pub mod store;
