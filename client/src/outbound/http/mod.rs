//! HTTP outbound adapter.
//!
//! This module provides a thin reqwest implementation of the
//! `ItemTransport` port.

mod dto;
mod http_transport;

pub use http_transport::HttpItemTransport;
