//! In-memory review backend.
//!
//! Backs the offline session mode and the loader tests. Every call is
//! recorded in order; mark-read calls record both their start and their
//! completion so overlapping requests are visible.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use super::DashboardApi;
use crate::error::DashboardError;
use crate::sample::sample_ideas;
use crate::types::{
    CommitteeInfo, CommitteeMember, EntityId, IdeaListResponse, IdeaStatus, IdeaUpdates,
    Notification, NotificationListResponse,
};

#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    ListIdeas,
    UpdateIdeaStatus(EntityId, String),
    ListNotifications,
    MarkReadStarted(EntityId),
    MarkReadFinished(EntityId),
    GetCommitteeInfo,
    Get(String),
    Post(String),
}

type Scripted<T> = (Duration, Result<T, String>);

#[derive(Default)]
pub struct MockDashboardApi {
    ideas: Mutex<IdeaListResponse>,
    scripted_ideas: Mutex<VecDeque<Scripted<IdeaListResponse>>>,
    ideas_error: Mutex<Option<String>>,
    reject_status_updates: Mutex<Option<String>>,
    notifications: Mutex<Vec<Notification>>,
    notifications_error: Mutex<Option<String>>,
    notifications_delay: Mutex<Duration>,
    unconfirmed_reads: Mutex<HashSet<EntityId>>,
    mark_read_delay: Mutex<Duration>,
    committee: Mutex<Option<CommitteeInfo>>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockDashboardApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend preloaded with the sample ideas, a committee and a couple of
    /// unread notifications.
    pub fn demo() -> Self {
        let mock = Self::new();
        mock.set_ideas(IdeaListResponse {
            ideas: sample_ideas(),
            committee_id: Some(EntityId::from(1)),
        });
        mock.set_committee(CommitteeInfo {
            name: "Innovation Review Committee".to_string(),
            description: "Reviews submitted ideas and approves execution plans.".to_string(),
            status: "active".to_string(),
            role: "chair".to_string(),
            members: vec![
                CommitteeMember {
                    name: "A. Rivera".to_string(),
                    role: Some("chair".to_string()),
                    email: None,
                },
                CommitteeMember {
                    name: "J. Okafor".to_string(),
                    role: Some("member".to_string()),
                    email: None,
                },
            ],
        });
        mock.set_notifications(vec![
            notification(1, false, "New idea submitted"),
            notification(2, false, "Meeting scheduled"),
            notification(3, true, "Evaluation completed"),
        ]);
        mock
    }

    pub fn set_ideas(&self, response: IdeaListResponse) {
        *self.ideas.lock() = response;
    }

    /// Queue a one-off response for the next `list_ideas` call, resolved
    /// after `delay`. Queued responses win over `set_ideas`/`fail_ideas`.
    pub fn push_ideas_response(&self, delay: Duration, result: Result<IdeaListResponse, String>) {
        self.scripted_ideas.lock().push_back((delay, result));
    }

    pub fn fail_ideas(&self, message: Option<&str>) {
        *self.ideas_error.lock() = message.map(str::to_string);
    }

    pub fn reject_status_updates(&self, message: Option<&str>) {
        *self.reject_status_updates.lock() = message.map(str::to_string);
    }

    pub fn set_notifications(&self, notifications: Vec<Notification>) {
        *self.notifications.lock() = notifications;
    }

    pub fn fail_notifications(&self, message: Option<&str>) {
        *self.notifications_error.lock() = message.map(str::to_string);
    }

    /// Hold every `list_notifications` answer for `delay`.
    pub fn set_notifications_delay(&self, delay: Duration) {
        *self.notifications_delay.lock() = delay;
    }

    /// Make the backend answer `false` for this notification.
    pub fn leave_unconfirmed(&self, id: EntityId) {
        self.unconfirmed_reads.lock().insert(id);
    }

    pub fn set_mark_read_delay(&self, delay: Duration) {
        *self.mark_read_delay.lock() = delay;
    }

    pub fn set_committee(&self, committee: CommitteeInfo) {
        *self.committee.lock() = Some(committee);
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    pub fn count_calls(&self, pred: impl Fn(&MockCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }

    /// Server-side view of a notification.
    pub fn notification(&self, id: &EntityId) -> Option<Notification> {
        self.notifications
            .lock()
            .iter()
            .find(|n| &n.id == id)
            .cloned()
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().push(call);
    }
}

/// Convenience constructor for notification fixtures.
pub fn notification(id: i64, is_read: bool, title: &str) -> Notification {
    Notification {
        id: EntityId::from(id),
        is_read,
        title: title.to_string(),
        message: String::new(),
        created_at: None,
        extra: Default::default(),
    }
}

#[async_trait]
impl DashboardApi for MockDashboardApi {
    async fn list_ideas(&self) -> Result<IdeaListResponse, DashboardError> {
        self.record(MockCall::ListIdeas);

        let scripted = self.scripted_ideas.lock().pop_front();
        if let Some((delay, result)) = scripted {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            return result.map_err(DashboardError::Network);
        }

        if let Some(message) = self.ideas_error.lock().clone() {
            return Err(DashboardError::Network(message));
        }
        Ok(self.ideas.lock().clone())
    }

    async fn update_idea_status(
        &self,
        idea_id: &EntityId,
        status: &IdeaStatus,
    ) -> Result<(), DashboardError> {
        self.record(MockCall::UpdateIdeaStatus(
            idea_id.clone(),
            status.as_str().to_string(),
        ));

        if let Some(message) = self.reject_status_updates.lock().clone() {
            return Err(DashboardError::Rejected(message));
        }

        let mut ideas = self.ideas.lock();
        match ideas.ideas.iter_mut().find(|i| &i.idea_id == idea_id) {
            Some(idea) => {
                IdeaUpdates::status(status.clone()).apply_to(idea);
                Ok(())
            }
            None => Err(DashboardError::Api {
                status: 404,
                message: format!("Idea {} not found", idea_id),
            }),
        }
    }

    async fn list_notifications(&self) -> Result<NotificationListResponse, DashboardError> {
        self.record(MockCall::ListNotifications);

        let delay = *self.notifications_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = self.notifications_error.lock().clone() {
            return Err(DashboardError::Network(message));
        }
        let notifications = self.notifications.lock().clone();
        let count = notifications.iter().filter(|n| !n.is_read).count() as u32;
        Ok(NotificationListResponse {
            notifications,
            count,
        })
    }

    async fn mark_notification_read(&self, id: &EntityId) -> Result<bool, DashboardError> {
        self.record(MockCall::MarkReadStarted(id.clone()));

        let delay = *self.mark_read_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let result = if let Some(message) = self.notifications_error.lock().clone() {
            Err(DashboardError::Network(message))
        } else if self.unconfirmed_reads.lock().contains(id) {
            Ok(false)
        } else {
            let mut notifications = self.notifications.lock();
            match notifications.iter_mut().find(|n| &n.id == id) {
                Some(n) => {
                    n.is_read = true;
                    Ok(true)
                }
                None => Ok(false),
            }
        };

        self.record(MockCall::MarkReadFinished(id.clone()));
        result
    }

    async fn get_committee_info(&self) -> Result<CommitteeInfo, DashboardError> {
        self.record(MockCall::GetCommitteeInfo);
        self.committee.lock().clone().ok_or(DashboardError::Api {
            status: 404,
            message: "No committee assigned".to_string(),
        })
    }

    async fn get_json(&self, path: &str) -> Result<Value, DashboardError> {
        self.record(MockCall::Get(path.to_string()));
        let idea_id = path
            .trim_start_matches('/')
            .strip_prefix("ideas/")
            .map(|rest| match rest.parse::<i64>() {
                Ok(n) => EntityId::from(n),
                Err(_) => EntityId::from(rest),
            });
        if let Some(idea_id) = idea_id {
            let ideas = self.ideas.lock();
            if let Some(idea) = ideas.ideas.iter().find(|i| i.idea_id == idea_id) {
                return Ok(serde_json::to_value(idea)?);
            }
        }
        Err(DashboardError::Api {
            status: 404,
            message: format!("Nothing at {}", path),
        })
    }

    async fn post_json(&self, path: &str, body: Value) -> Result<Value, DashboardError> {
        self.record(MockCall::Post(path.to_string()));
        Ok(json!({ "success": true, "echo": body }))
    }
}
