#![deny(missing_docs)]
//! LaifulShop core library.
//!
//! Transport-agnostic conversation engine for the Atlantic H2H shop:
//! sessions, rate limiting, caches, command routing and the purchase,
//! bill, deposit and transfer flows.

/// Short-lived keyed cache and latest-snapshot slot.
pub mod cache;
/// Catalog records parsed from gateway responses.
pub mod catalog;
/// Configuration management.
pub mod config;
/// Error taxonomy for a single interaction.
pub mod error;
/// Conversation flows, one module per domain.
pub mod flows;
/// Text helpers: prices, nominal parsing, reference ids, button ids.
pub mod format;
/// Payment gateway interface, response accessors and the Atlantic client.
pub mod gateway;
/// Rendering interface consumed by the flows.
pub mod presenter;
/// Per-sender cooldown gate.
pub mod rate_limit;
/// Command parsing and state-machine dispatch.
pub mod router;
/// Per-sender conversation sessions.
pub mod session;
/// The shop service that owns every process-scoped registry.
pub mod shop;

/// Test support: recording presenter and gateway fixtures.
#[cfg(test)]
pub mod testing;

pub use error::ShopError;
pub use router::Interaction;
pub use shop::Shop;
