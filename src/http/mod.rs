//! HTTP protocol layer module
//!
//! Response construction shared by the request handler.

pub mod response;

pub use response::{build_json_response, JSON_CONTENT_TYPE};
