//! Item catalogue client library.
//!
//! The domain layer owns the item entity, the field-level diff generator and
//! the [`domain::ItemClient`] that sends partial updates and reconciles the
//! replies. Driven adapters under [`outbound`] implement the transport port
//! over HTTP or in memory.

mod config;
pub mod domain;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{ClientSettings, SettingsError};
