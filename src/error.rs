//! Errors produced by room client operations.

use std::path::PathBuf;

/// Errors produced by room client operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request never produced a response (DNS, connect, TLS, read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The session id contains bytes that are not valid in a header value.
    #[error("invalid session header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// The room server answered with a non-success HTTP status.
    #[error("room server returned status {status}")]
    ApiResponse { status: u16, body: String },

    /// A request or response body was not the expected JSON.
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The session file could not be read or written.
    #[error("session file {}: {source}", path.display())]
    SessionIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RoomError {
    /// HTTP status code carried by this error, if the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiResponse { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T, E = RoomError> = std::result::Result<T, E>;

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
