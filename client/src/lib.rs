//! # client
//!
//! Client-side session state for the loginkit gateway: the persisted bearer
//! token, the current user profile, and the login/register/logout flows with
//! their navigation side effects.
//!
//! A single [`state::auth::Session`] is built at application start and shared
//! by reference with whatever UI layer drives it.

pub mod config;
pub mod navigate;
pub mod net;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_helpers;
