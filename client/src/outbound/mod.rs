//! Outbound adapters implementing the item transport port.
//!
//! - **http**: reqwest-backed adapter speaking the catalogue service's REST
//!   routes and JSON DTOs
//! - **memory**: in-process store with scripted and random fault injection,
//!   used as a test double and for offline demos
//!
//! Adapters translate between wire representations and domain types. They
//! contain no reconciliation logic.

pub mod http;
pub mod memory;
