//! # trueline
//!
//! Client core for the Trueline services site: a typed request client for
//! the remote REST API, a persisted session/auth store, and the route guard
//! that gates the admin dashboard.
//!
//! Dependency order, leaves first: `net` -> `state::auth` (logs in through
//! the client) -> `routes` (reads the store). Pages and rendering live
//! outside this crate and call into these pieces.

pub mod config;
pub mod error;
pub mod forms;
pub mod net;
pub mod routes;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;
