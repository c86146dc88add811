//! Remote review service.
//!
//! Modules:
//! - client: reqwest implementation with bearer auth and bounded retry
//! - credentials: injected token sources
//! - mock: in-memory backend that records every call

pub mod client;
pub mod credentials;
pub mod mock;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::DashboardError;
use crate::types::{
    CommitteeInfo, EntityId, IdeaListResponse, IdeaStatus, NotificationListResponse,
};

/// Operations the dashboard core needs from the backend.
///
/// Implementations report outcomes only; status-code handling (including
/// the expired-session redirect) stays inside the transport.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn list_ideas(&self) -> Result<IdeaListResponse, DashboardError>;

    async fn update_idea_status(
        &self,
        idea_id: &EntityId,
        status: &IdeaStatus,
    ) -> Result<(), DashboardError>;

    async fn list_notifications(&self) -> Result<NotificationListResponse, DashboardError>;

    /// `Ok(false)` means the backend answered but did not confirm the change.
    async fn mark_notification_read(&self, id: &EntityId) -> Result<bool, DashboardError>;

    async fn get_committee_info(&self) -> Result<CommitteeInfo, DashboardError>;

    async fn get_json(&self, path: &str) -> Result<Value, DashboardError>;

    async fn post_json(&self, path: &str, body: Value) -> Result<Value, DashboardError>;
}
