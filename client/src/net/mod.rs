//! Network layer: wire types and the HTTP client for the gateway.

pub mod api;
pub mod types;
