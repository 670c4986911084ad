//! # loginkit
//!
//! HTTP gateway for username/password authentication. Applies the frontend
//! cross-origin policy, parses JSON bodies, and mounts the `/login`,
//! `/register`, and `/user/me` routes consumed by the `client` session crate.

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
