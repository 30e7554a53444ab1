//! Daemon pinger module
//!
//! Issues the single outbound `GET <url>/info` to a daemon and turns the
//! outcome into a [`PingResult`]. Every failure, whatever its cause,
//! collapses into [`RequestError::UpstreamUnavailable`]; the cause is only
//! written to the error log.

pub mod uri;

use std::time::{Duration, Instant};

use hyper::StatusCode;
use reqwest::header::ACCEPT;
use serde::Serialize;
use serde_json::Value;

use crate::error::RequestError;
use crate::logger;

pub use uri::is_web_uri;

/// Hard upper bound for the whole daemon round trip
pub const DAEMON_TIMEOUT: Duration = Duration::from_millis(4000);

/// Path appended to the submitted daemon URL
pub const INFO_PATH: &str = "/info";

/// Key injected into a successful daemon response
pub const PINGER_INFO_KEY: &str = "pingerInfo";

/// Status code and JSON body handed back to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct PingResult {
    pub code: StatusCode,
    pub response: Value,
}

impl From<RequestError> for PingResult {
    fn from(err: RequestError) -> Self {
        Self {
            code: err.status(),
            response: err.to_body(),
        }
    }
}

/// Metadata appended to the daemon's own payload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingerInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcp_region: Option<String>,
    /// Round trip in whole milliseconds
    pub time: u64,
}

/// Why a daemon call did not produce a usable response
#[derive(Debug, thiserror::Error)]
pub enum PingError {
    #[error("no complete response within {0:?}")]
    Timeout(Duration),
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("body is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("body is JSON but not an object")]
    NotAnObject,
}

/// Outbound client for daemon `/info` endpoints
pub struct DaemonPinger {
    client: reqwest::Client,
    region: Option<String>,
    timeout: Duration,
}

impl DaemonPinger {
    pub fn new(region: Option<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(region, DAEMON_TIMEOUT)
    }

    pub fn with_timeout(region: Option<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            region,
            timeout,
        })
    }

    #[cfg(test)]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Call `url` once and report the outcome. Never fails outward.
    pub async fn ping(&self, url: &str) -> PingResult {
        match self.fetch_info(url).await {
            Ok(body) => PingResult {
                code: StatusCode::OK,
                response: body,
            },
            Err(err) => {
                logger::log_ping_failure(url, &err);
                RequestError::UpstreamUnavailable.into()
            }
        }
    }

    async fn fetch_info(&self, url: &str) -> Result<Value, PingError> {
        let started = Instant::now();

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(PingError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        let elapsed = started.elapsed();

        let mut body: Value = serde_json::from_slice(&bytes).map_err(PingError::Decode)?;
        let Value::Object(fields) = &mut body else {
            return Err(PingError::NotAnObject);
        };

        let info = PingerInfo {
            gcp_region: self.region.clone(),
            time: round_millis(elapsed),
        };
        fields.insert(
            PINGER_INFO_KEY.to_string(),
            serde_json::to_value(info).map_err(PingError::Decode)?,
        );

        Ok(body)
    }

    fn classify(&self, err: reqwest::Error) -> PingError {
        if err.is_timeout() {
            PingError::Timeout(self.timeout)
        } else {
            PingError::Transport(err)
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_millis(elapsed: Duration) -> u64 {
    (elapsed.as_secs_f64() * 1000.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{spawn_daemon, unused_addr};

    fn pinger(region: Option<&str>) -> DaemonPinger {
        DaemonPinger::new(region.map(ToString::to_string)).unwrap()
    }

    fn upstream_error() -> PingResult {
        RequestError::UpstreamUnavailable.into()
    }

    #[test]
    fn test_round_millis() {
        assert_eq!(round_millis(Duration::from_micros(49_400)), 49);
        assert_eq!(round_millis(Duration::from_micros(49_600)), 50);
        assert_eq!(round_millis(Duration::ZERO), 0);
    }

    #[test]
    fn test_pinger_info_omits_missing_region() {
        let info = PingerInfo {
            gcp_region: None,
            time: 12,
        };
        assert_eq!(serde_json::to_string(&info).unwrap(), r#"{"time":12}"#);

        let info = PingerInfo {
            gcp_region: Some("us-east1".to_string()),
            time: 12,
        };
        assert_eq!(
            serde_json::to_string(&info).unwrap(),
            r#"{"gcpRegion":"us-east1","time":12}"#
        );
    }

    #[tokio::test]
    async fn test_success_appends_pinger_info() {
        let base = spawn_daemon(200, r#"{"height":100,"status":"OK"}"#, Duration::from_millis(50)).await;
        let result = pinger(Some("us-east1")).ping(&format!("{base}{INFO_PATH}")).await;

        assert_eq!(result.code, StatusCode::OK);
        assert_eq!(result.response["height"], 100);
        assert_eq!(result.response["status"], "OK");
        assert_eq!(result.response["pingerInfo"]["gcpRegion"], "us-east1");
        let time = result.response["pingerInfo"]["time"].as_u64().unwrap();
        assert!(time >= 50, "time was {time}");

        let keys: Vec<&str> = result
            .response
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["height", "status", "pingerInfo"]);
    }

    #[tokio::test]
    async fn test_success_without_region() {
        let base = spawn_daemon(200, r#"{"height":7}"#, Duration::ZERO).await;
        let result = pinger(None).ping(&format!("{base}{INFO_PATH}")).await;

        assert_eq!(result.code, StatusCode::OK);
        let info = result.response["pingerInfo"].as_object().unwrap();
        assert!(!info.contains_key("gcpRegion"));
        assert!(info["time"].is_u64());
    }

    #[tokio::test]
    async fn test_existing_pinger_info_is_replaced() {
        let base = spawn_daemon(200, r#"{"pingerInfo":"stale","height":1}"#, Duration::ZERO).await;
        let result = pinger(Some("eu-west1")).ping(&format!("{base}{INFO_PATH}")).await;

        assert_eq!(result.code, StatusCode::OK);
        assert_eq!(result.response["pingerInfo"]["gcpRegion"], "eu-west1");
        assert_eq!(result.response["height"], 1);
    }

    #[tokio::test]
    async fn test_non_200_status() {
        let base = spawn_daemon(503, r#"{"status":"busy"}"#, Duration::ZERO).await;
        let result = pinger(None).ping(&format!("{base}{INFO_PATH}")).await;
        assert_eq!(result, upstream_error());
    }

    #[tokio::test]
    async fn test_wrong_path_is_not_found() {
        let base = spawn_daemon(200, r#"{"height":1}"#, Duration::ZERO).await;
        let result = pinger(None).ping(&format!("{base}/getinfo")).await;
        assert_eq!(result, upstream_error());
    }

    #[tokio::test]
    async fn test_non_json_body() {
        let base = spawn_daemon(200, "<html>hello</html>", Duration::ZERO).await;
        let result = pinger(None).ping(&format!("{base}{INFO_PATH}")).await;
        assert_eq!(result, upstream_error());
    }

    #[tokio::test]
    async fn test_json_array_body() {
        let base = spawn_daemon(200, "[1,2,3]", Duration::ZERO).await;
        let result = pinger(None).ping(&format!("{base}{INFO_PATH}")).await;
        assert_eq!(result, upstream_error());
    }

    #[tokio::test]
    async fn test_slow_daemon_times_out() {
        let base = spawn_daemon(200, r#"{"height":1}"#, Duration::from_secs(2)).await;
        let pinger = DaemonPinger::with_timeout(None, Duration::from_millis(200)).unwrap();

        let started = Instant::now();
        let result = pinger.ping(&format!("{base}{INFO_PATH}")).await;

        assert_eq!(result, upstream_error());
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let addr = unused_addr().await;
        let result = pinger(None).ping(&format!("http://{addr}{INFO_PATH}")).await;
        assert_eq!(result, upstream_error());
    }

    #[test]
    fn test_default_timeout() {
        let pinger = pinger(Some("asia-east1"));
        assert_eq!(pinger.timeout, DAEMON_TIMEOUT);
        assert_eq!(pinger.region.as_deref(), Some("asia-east1"));
    }
}
