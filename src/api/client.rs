//! HTTP client for the review backend.
//!
//! Uses reqwest with Bearer token auth from an injected `CredentialProvider`.
//! Endpoints are resolved against the configured base URL. A 401 means the
//! session expired: the optional auth-expired hook fires (the host uses it to
//! send the user back to sign-in) and the call fails with `AuthExpired`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

use super::credentials::CredentialProvider;
use super::DashboardApi;
use crate::config::{DashboardConfig, RetryConfig};
use crate::error::{extract_server_message, DashboardError};
use crate::types::{
    Ack, CommitteeInfo, EntityId, IdeaListResponse, IdeaStatus, NotificationListResponse,
};

/// Called once per 401 response.
pub type AuthExpiredHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            initial_backoff_ms: config.initial_backoff_ms,
            max_backoff_ms: config.max_backoff_ms,
        }
    }
}

impl RetryPolicy {
    /// Pause after failed attempt `attempt` (1-based): doubles from the
    /// initial backoff and never exceeds the maximum.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u64::MAX);
        Duration::from_millis(
            self.initial_backoff_ms
                .saturating_mul(factor)
                .min(self.max_backoff_ms),
        )
    }

    /// Attempts allowed for `method`. Only requests that are safe to
    /// repeat get more than one.
    fn attempts_for(&self, method: &Method) -> u32 {
        if *method == Method::GET || *method == Method::PUT || *method == Method::DELETE {
            self.max_attempts.max(1)
        } else {
            1
        }
    }
}

/// Parse a mutation acknowledgement. Empty bodies count as success.
fn parse_ack(body: &[u8]) -> Result<Ack, DashboardError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Ack {
            success: true,
            message: None,
        });
    }
    Ok(serde_json::from_slice(body)?)
}

pub struct HttpDashboardApi {
    client: reqwest::Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
    retry: RetryPolicy,
    on_auth_expired: Option<AuthExpiredHook>,
}

impl HttpDashboardApi {
    pub fn new(
        config: &DashboardConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, DashboardError> {
        let mut base = config.api_base_url.trim().to_string();
        // Url::join drops the last path segment unless the base ends in '/'.
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url,
            credentials,
            retry: RetryPolicy::from(&config.retry),
            on_auth_expired: None,
        })
    }

    pub fn with_auth_expired_hook(mut self, hook: AuthExpiredHook) -> Self {
        self.on_auth_expired = Some(hook);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, DashboardError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Send with bounded retry. Failures that `DashboardError::is_retryable`
    /// accepts are retried for idempotent methods only.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Vec<u8>, DashboardError> {
        let attempts = self.retry.attempts_for(&method);
        let mut attempt = 1;
        loop {
            match self.send_once(&method, path, body).await {
                Err(e) if e.is_retryable() && attempt < attempts => {
                    let delay = self.retry.backoff(attempt);
                    log::warn!(
                        "api {} {}: attempt {}/{} failed ({}), retrying in {:?}",
                        method,
                        path,
                        attempt,
                        attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn send_once(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Vec<u8>, DashboardError> {
        let url = self.endpoint(path)?;
        let mut request = self.client.request(method.clone(), url);
        if let Some(token) = self.credentials.bearer_token()? {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let resp = request.send().await?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            log::warn!("api {} {}: session expired", method, path);
            if let Some(hook) = &self.on_auth_expired {
                hook();
            }
            return Err(DashboardError::AuthExpired);
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(DashboardError::Api {
                status: status.as_u16(),
                message: extract_server_message(&text),
            });
        }

        Ok(resp.bytes().await?.to_vec())
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, DashboardError> {
        let bytes = self.send(method, path, body).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn request_ack(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Ack, DashboardError> {
        let bytes = self.send(method, path, body).await?;
        parse_ack(&bytes)
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn list_ideas(&self) -> Result<IdeaListResponse, DashboardError> {
        self.request_json(Method::GET, "ideas", None).await
    }

    async fn update_idea_status(
        &self,
        idea_id: &EntityId,
        status: &IdeaStatus,
    ) -> Result<(), DashboardError> {
        let body = json!({ "status": status.as_str() });
        let ack = self
            .request_ack(Method::PUT, &format!("ideas/{}/status", idea_id), Some(&body))
            .await?;
        if ack.success {
            Ok(())
        } else {
            Err(DashboardError::Rejected(
                ack.message
                    .unwrap_or_else(|| format!("status change to {} refused", status)),
            ))
        }
    }

    async fn list_notifications(&self) -> Result<NotificationListResponse, DashboardError> {
        self.request_json(Method::GET, "notifications", None).await
    }

    async fn mark_notification_read(&self, id: &EntityId) -> Result<bool, DashboardError> {
        let ack = self
            .request_ack(Method::PUT, &format!("notifications/{}/read", id), None)
            .await?;
        Ok(ack.success)
    }

    async fn get_committee_info(&self) -> Result<CommitteeInfo, DashboardError> {
        self.request_json(Method::GET, "committee", None).await
    }

    async fn get_json(&self, path: &str) -> Result<Value, DashboardError> {
        self.request_json(Method::GET, path, None).await
    }

    async fn post_json(&self, path: &str, body: Value) -> Result<Value, DashboardError> {
        let bytes = self.send(Method::POST, path, Some(&body)).await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}
