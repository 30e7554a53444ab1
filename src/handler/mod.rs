//! Request handler module
//!
//! Validates inbound ping requests and relays the daemon's answer.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
