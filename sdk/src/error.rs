//! Error values carried inside response envelopes.
//!
//! # Design
//! Failures are never thrown past the transport boundary: every layer
//! returns a fully-formed envelope whose `error` slot may be populated.
//! `ErrorCode` is a classification, not an exception type — upper layers
//! pass it through unchanged while reshaping `data`. The underlying native
//! cause is kept only in `Full` serialization mode because it cannot cross
//! a plain-data boundary.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::envelope::SerializationMode;

/// Classification code for an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    /// No target URL was supplied on the request.
    #[serde(rename = "ERR_NO_URL")]
    NoUrl,

    /// The supplied URL string does not parse as an absolute URL.
    #[serde(rename = "ERR_INVALID_URL")]
    InvalidUrl,

    /// The server answered with a non-2xx status.
    #[serde(rename = "ERR_NETWORK")]
    Network,

    /// No more specific classification (transport or body-processing
    /// failure wrapping an underlying error).
    #[serde(rename = "ERR_NO_CODE")]
    NoCode,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NoUrl => "ERR_NO_URL",
            ErrorCode::InvalidUrl => "ERR_INVALID_URL",
            ErrorCode::Network => "ERR_NETWORK",
            ErrorCode::NoCode => "ERR_NO_CODE",
        }
    }
}

/// Error value reported inside a response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub name: String,
    pub message: String,
    pub code: ErrorCode,
    /// HTTP status when the error reflects an HTTP-level failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Underlying cause. Omitted in `PlainData` mode so the envelope stays
    /// serializable end to end.
    #[serde(skip)]
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl ApiError {
    /// Build a classified error with no underlying cause.
    pub fn new(name: &str, message: &str, code: ErrorCode) -> Self {
        Self {
            name: name.to_string(),
            message: message.to_string(),
            code,
            status: None,
            source: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Wrap a native error. The cause is attached only in `Full` mode.
    pub fn from_source<E>(source: E, mode: SerializationMode) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let mut err = Self::new("Error", &source.to_string(), ErrorCode::NoCode);
        if mode == SerializationMode::Full {
            err.source = Some(Arc::new(source));
        }
        err
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "[{}] {} ({status}): {}", self.code.as_str(), self.name, self.message),
            None => write!(f, "[{}] {}: {}", self.code.as_str(), self.name, self.message),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}
