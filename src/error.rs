//! Error type for gateway operations
//!
//! Every fallible library call returns [`Error`]. Failures reported by the
//! gateway keep their HTTP status, and failures raised by a caller-supplied
//! download sink are carried through untouched so callers can tell
//! "the server said no" apart from "my own destination broke".

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by gateway operations
#[derive(Debug, Error)]
pub enum Error {
    /// The gateway answered outside the expected status
    #[error("request failed ({status}): {message}")]
    Request { status: u16, message: String },

    /// A success-shaped response that does not match the documented contract
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// The caller's download destination failed
    #[error(transparent)]
    Sink(std::io::Error),

    /// Connection, timeout or body-read failure below HTTP semantics
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid gateway url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// An id that cannot stand as a single path segment
    #[error("invalid resource id: {0:?}")]
    InvalidId(String),

    #[error("invalid api token: {0}")]
    InvalidToken(String),
}

impl Error {
    pub fn request(status: u16, message: impl Into<String>) -> Self {
        Self::Request {
            status,
            message: message.into(),
        }
    }

    pub fn contract(message: impl Into<String>) -> Self {
        Self::ContractViolation(message.into())
    }

    /// HTTP status carried by a [`Error::Request`]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Short message suitable for showing to a user.
    /// Security: gateway bodies are not echoed for auth and server failures.
    pub fn user_message(&self) -> String {
        match self {
            Self::Request { status, message } => match status {
                400 | 422 => format!("Invalid request: {}", truncate(message, 120)),
                401 => "Authentication failed. Check your API token (CDX_TOKEN).".to_string(),
                403 => "Permission denied.".to_string(),
                404 => "Resource not found.".to_string(),
                409 => "Resource conflict. The resource may already exist or be in use.".to_string(),
                429 => "Rate limit exceeded. Please try again later.".to_string(),
                500..=599 => "Gateway temporarily unavailable. Please try again.".to_string(),
                _ => format!("Request failed with status {}.", status),
            },
            Self::ContractViolation(_) => {
                "Unexpected response from the gateway. Check client and gateway versions.".to_string()
            }
            Self::Sink(e) => format!("Failed to write output: {}", e),
            Self::Transport(e) if e.is_timeout() => "Request timed out.".to_string(),
            Self::Transport(_) => {
                "Could not reach the gateway. Check your network connection and base URL."
                    .to_string()
            }
            other => truncate(&other.to_string(), 120),
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .collect();
    if cleaned.len() > max {
        format!("{}...", &cleaned[..max])
    } else {
        cleaned
    }
}
