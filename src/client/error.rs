//! Client error types

use thiserror::Error;

/// Errors that can occur when talking to the activities API
#[derive(Error, Debug)]
pub enum ClientError {
    /// Server could not be reached
    #[error("Activities API unavailable")]
    Unavailable,

    /// Request timed out
    #[error("Request timeout")]
    Timeout,

    /// Any other transport-level failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response body was not the expected JSON
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// Server answered with a non-2xx status
    #[error("API error {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },
}

impl ClientError {
    /// Wraps a reqwest failure the same way for every call
    pub(crate) fn from_send(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_connect() {
            ClientError::Unavailable
        } else {
            ClientError::Request(e)
        }
    }

    /// True for failures where no usable answer came back from the server
    pub fn is_transport(&self) -> bool {
        !matches!(self, ClientError::Api { .. })
    }

    /// Server-provided detail, if this is an API rejection that carried one
    pub fn detail(&self) -> Option<&str> {
        match self {
            ClientError::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
