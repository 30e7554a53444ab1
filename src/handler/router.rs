//! Request dispatch module
//!
//! Entry point for HTTP request processing: validates method, content type
//! and the `url` field, then hands the daemon URL to the pinger.

use crate::config::AppState;
use crate::error::RequestError;
use crate::http::{self, JSON_CONTENT_TYPE};
use crate::logger::{self, AccessLogEntry};
use crate::pinger::{is_web_uri, PingResult, INFO_PATH};
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{CONTENT_TYPE, USER_AGENT};
use hyper::{HeaderMap, Method, Request, Response};
use serde_json::Value;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();

    let mut entry = state.config.logging.access_log.then(|| access_entry(&req, peer_addr));

    let (result, daemon_url) = match validate_request(req, state.config.http.max_body_size).await {
        Ok(url) => {
            let daemon_url = format!("{url}{INFO_PATH}");
            (state.pinger.ping(&daemon_url).await, Some(daemon_url))
        }
        Err(err) => (PingResult::from(err), None),
    };

    let response =
        http::build_json_response(result.code, &result.response, &state.config.http.server_name);

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().map_or(0, |n| {
            usize::try_from(n).unwrap_or(usize::MAX)
        });
        entry.daemon_url = daemon_url;
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Run the checks in order, first failure wins. Returns the submitted URL.
pub async fn validate_request<B>(req: Request<B>, max_body_size: u64) -> Result<String, RequestError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if req.method() != Method::POST {
        return Err(RequestError::MethodNotAllowed);
    }

    if !is_json_content_type(req.headers()) {
        return Err(RequestError::UnsupportedMediaType);
    }

    let body = read_body(req.into_body(), max_body_size)
        .await
        .ok_or(RequestError::InvalidInput)?;

    extract_url(&body).ok_or(RequestError::InvalidInput)
}

/// Only the exact value `application/json` is accepted
fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .is_some_and(|value| value.as_bytes() == JSON_CONTENT_TYPE.as_bytes())
}

/// Collect the body, giving up past `max_body_size` bytes
async fn read_body<B>(body: B, max_body_size: u64) -> Option<Bytes>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Some(collected.to_bytes()),
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body (max {max_body_size} bytes): {e}"));
            None
        }
    }
}

/// Pull a valid web URL out of the body's `url` field. The body must be a JSON object.
fn extract_url(body: &[u8]) -> Option<String> {
    let Value::Object(fields) = serde_json::from_slice::<Value>(body).ok()? else {
        return None;
    };
    fields
        .get("url")
        .and_then(Value::as_str)
        .filter(|url| is_web_uri(url))
        .map(ToString::to_string)
}

fn access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.http_version = http_version(req.version()).to_string();
    entry.user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    entry
}

fn http_version(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
