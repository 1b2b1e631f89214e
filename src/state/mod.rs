//! Shared client-side state.
//!
//! DESIGN
//! ======
//! Only authentication is process-wide; feature data is fetched per call
//! and owned by whoever asked for it.

pub mod auth;
