//! Error types for the MyHealth API client.
//!
//! # Design
//! There is one failure kind from the caller's point of view: the operation
//! did not produce a usable result. The variants only record where the
//! message came from. A non-2xx response carries the response body verbatim
//! (or a generic fallback when the body is empty) because the view shows it
//! as-is after an operation-specific prefix.

use thiserror::Error;

/// Message used when a non-2xx response has an empty body.
pub const FALLBACK_MESSAGE: &str = "Request failed";

/// Errors returned by `HealthClient` parse methods and by transports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The request never produced a response (connection refused, DNS,
    /// unreadable body).
    #[error("{0}")]
    Transport(String),

    /// The response body did not match the expected schema.
    #[error("unexpected response: {0}")]
    Deserialization(String),

    /// The request payload could not be encoded.
    #[error("could not encode request: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Build the failure for a non-2xx response from its status and body text.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = if body.is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            body.to_string()
        };
        ApiError::Http { status, message }
    }

    /// HTTP status for failures that came from the server.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}
