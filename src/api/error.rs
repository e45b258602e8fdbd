//! API client error types.

use derive_more::{Display, Error};
use tracing::{error, instrument};

/// Category of API failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ApiErrorKind {
    /// Connection, TLS or other transport failure.
    #[display("transport")]
    Transport,
    /// The authority answered with a non-success status.
    #[display("status {}", _0)]
    Status(u16),
    /// The response body did not match the expected shape.
    #[display("decode")]
    Decode,
    /// The configured base URL is unusable.
    #[display("url")]
    Url,
}

/// API error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("API error ({}): {} at {}:{}", kind, message, file, line)]
pub struct ApiError {
    /// Failure category.
    pub kind: ApiErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ApiError {
    /// Creates a new API error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        let message = message.into();
        error!(%kind, error_message = %message, "API error created");
        Self {
            kind,
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_decode() {
            ApiErrorKind::Decode
        } else if let Some(status) = err.status() {
            ApiErrorKind::Status(status.as_u16())
        } else {
            ApiErrorKind::Transport
        };
        Self::new(kind, format!("HTTP request failed: {}", err))
    }
}

impl From<serde_json::Error> for ApiError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(ApiErrorKind::Decode, format!("Invalid response body: {}", err))
    }
}
