//! Outbound API plumbing.
//!
//! DESIGN
//! ======
//! `request` describes one call, `client` sends it and normalizes the
//! result, `api` holds one function per feature action, and `types` holds
//! the wire records those functions exchange.

pub mod api;
pub mod client;
pub mod request;
pub mod types;
