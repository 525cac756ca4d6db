//! Catalog change notifications.
//!
//! A small publish/subscribe layer: admin mutations publish a
//! [`CatalogEvent`], the catalog reader and the WebSocket feed subscribe.

pub mod bus;

pub use bus::{CatalogEvent, EventBus};
