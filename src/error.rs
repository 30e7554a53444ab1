//! Request outcome errors
//!
//! Every failure a caller can observe falls into one of these four
//! categories. The messages are part of the wire contract.

use hyper::StatusCode;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("only responds to POST requests")]
    MethodNotAllowed,
    #[error("only accepts application/json")]
    UnsupportedMediaType,
    #[error("no url or invalid url provided")]
    InvalidInput,
    #[error("Daemon didn't respond as expected or within 4 seconds")]
    UpstreamUnavailable,
}

impl RequestError {
    /// HTTP status the error is reported with
    pub const fn status(self) -> StatusCode {
        match self {
            Self::MethodNotAllowed | Self::UnsupportedMediaType | Self::InvalidInput => {
                StatusCode::BAD_REQUEST
            }
            Self::UpstreamUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// `{"error": "<message>"}`
    pub fn to_body(self) -> Value {
        json!({ "error": self.to_string() })
    }
}
