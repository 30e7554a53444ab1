//! HTTP response building module
//!
//! Every response the service sends is a compact JSON document.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE, SERVER};
use hyper::{Response, StatusCode};
use serde_json::Value;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Body sent when the real body cannot be serialized
const FALLBACK_BODY: &str = r#"{"error":"Daemon didn't respond as expected or within 4 seconds"}"#;

/// Build a JSON response with the given status
pub fn build_json_response(
    status: StatusCode,
    body: &Value,
    server_name: &str,
) -> Response<Full<Bytes>> {
    let (status, payload) = match serde_json::to_vec(body) {
        Ok(bytes) => (status, Bytes::from(bytes)),
        Err(e) => {
            log_build_error("JSON", &e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Bytes::from_static(FALLBACK_BODY.as_bytes()),
            )
        }
    };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .header(CONTENT_LENGTH, payload.len())
        .header(SERVER, server_name)
        .body(Full::new(payload.clone()))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            let mut response = Response::new(Full::new(payload));
            *response.status_mut() = status;
            response
        })
}

/// Log response build error
fn log_build_error(what: &str, error: &dyn std::fmt::Display) {
    crate::logger::log_error(&format!("Failed to build {what} response: {error}"));
}
