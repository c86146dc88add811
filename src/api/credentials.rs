//! Bearer token sources.
//!
//! The token is owned by whatever signed the user in; the dashboard only
//! reads it. Providers are passed to the client explicitly.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::DashboardError;

pub trait CredentialProvider: Send + Sync {
    /// Current bearer token, `None` when signed out.
    fn bearer_token(&self) -> Result<Option<String>, DashboardError>;
}

/// Fixed token, mostly for tests and scripted sessions.
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        StaticToken(Some(token.into()))
    }

    pub fn anonymous() -> Self {
        StaticToken(None)
    }
}

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> Result<Option<String>, DashboardError> {
        Ok(self.0.clone())
    }
}

/// Token read from a file on every request, so a re-login elsewhere is
/// picked up without restarting.
///
/// Accepts either the raw token or `{"token": "..."}` (also `access_token`).
pub struct FileCredentials {
    path: PathBuf,
}

#[derive(Deserialize)]
struct TokenFile {
    #[serde(alias = "access_token")]
    token: String,
}

impl FileCredentials {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl CredentialProvider for FileCredentials {
    fn bearer_token(&self) -> Result<Option<String>, DashboardError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        if trimmed.starts_with('{') {
            let parsed: TokenFile = serde_json::from_str(trimmed).map_err(|e| {
                DashboardError::Credentials(format!("{}: {}", self.path.display(), e))
            })?;
            let token = parsed.token.trim().to_string();
            return Ok(if token.is_empty() { None } else { Some(token) });
        }

        Ok(Some(trimmed.to_string()))
    }
}
