//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own credential and token bookkeeping so route handlers
//! stay focused on request parsing and response shaping.

pub mod session;
pub mod users;
