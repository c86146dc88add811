//! Error types for the dashboard core.
//!
//! Failures are classified by how the dashboard reacts to them:
//! - RecoverableWithFallback: idea list degrades to sample data
//! - RecoverableSilent: notification calls are logged, next poll retries
//! - Propagated: one-shot calls hand the error back to the caller

use thiserror::Error;

/// Shown when a failure carries no server-supplied message.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Session expired, please sign in again")]
    AuthExpired,

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credentials unavailable: {0}")]
    Credentials(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level failure without an underlying reqwest error.
    #[error("Network error: {0}")]
    Network(String),
}

impl DashboardError {
    /// Returns true if a retry of the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            DashboardError::Http(e) => e.is_timeout() || e.is_connect(),
            DashboardError::Network(_) => true,
            DashboardError::Api { status, .. } => {
                *status == 408 || *status == 429 || (500..600).contains(status)
            }
            _ => false,
        }
    }

    /// Message supplied by the backend, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            DashboardError::Api { message, .. } | DashboardError::Rejected(message) => {
                let trimmed = message.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed)
                }
            }
            _ => None,
        }
    }

    /// Text suitable for the UI: the server's message when it sent one,
    /// otherwise a generic line.
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::AuthExpired => self.to_string(),
            _ => self
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
        }
    }
}

/// Pull a human message out of an error response body.
///
/// Backends answer with `{"message": ...}`, `{"error": ...}` or
/// `{"detail": ...}`; anything else is passed through as raw text.
pub fn extract_server_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error", "detail"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    body.trim().to_string()
}
