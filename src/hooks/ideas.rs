//! Idea list loader.
//!
//! A failed load does not leave the dashboard empty: the loader records a
//! visible error and falls back to the built-in sample ideas.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::LoadingGuard;
use crate::api::DashboardApi;
use crate::reducer::Action;
use crate::sample::sample_ideas;
use crate::state::Dispatcher;
use crate::types::{CommitteeSummary, EntityId, Idea, IdeaStatus, IdeaUpdates};

#[derive(Debug, Clone, Default)]
pub struct IdeaListState {
    pub data: Vec<Idea>,
    pub summary: CommitteeSummary,
    pub loading: bool,
    pub error: Option<String>,
    /// True while `data` is the sample fallback.
    pub degraded: bool,
    pub last_loaded_at: Option<DateTime<Utc>>,
}

pub struct IdeaListLoader {
    api: Arc<dyn DashboardApi>,
    state: Mutex<IdeaListState>,
    dispatcher: Option<Dispatcher>,
}

impl IdeaListLoader {
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        Self {
            api,
            state: Mutex::new(IdeaListState::default()),
            dispatcher: None,
        }
    }

    /// Also publish results to the dashboard store.
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn snapshot(&self) -> IdeaListState {
        self.state.lock().clone()
    }

    /// Load the idea list. Returns true when live data arrived, false when
    /// the sample fallback was used.
    ///
    /// Concurrent fetches are not sequenced: whichever response resolves
    /// last wins, even if it was requested first.
    pub async fn fetch(&self) -> bool {
        let _loading = LoadingGuard::begin(
            &self.state,
            |s| {
                s.loading = true;
                s.error = None;
            },
            |s| s.loading = false,
        );

        match self.api.list_ideas().await {
            Ok(resp) => {
                let summary = CommitteeSummary {
                    committee_id: resp.committee_id.clone(),
                    idea_count: resp.ideas.len(),
                };
                log::info!(
                    "Ideas: loaded {} ideas (committee {})",
                    summary.idea_count,
                    summary
                        .committee_id
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| "-".to_string())
                );

                let recovered = {
                    let mut state = self.state.lock();
                    state.data = resp.ideas.clone();
                    state.summary = summary;
                    state.last_loaded_at = Some(Utc::now());
                    std::mem::replace(&mut state.degraded, false)
                };
                self.publish(Action::SetIdeas(resp.ideas));
                if recovered {
                    // Withdraw the load error published by the failed attempt.
                    self.publish(Action::SetErrors(Vec::new()));
                }
                true
            }
            Err(e) => {
                let message = format!("Failed to load ideas: {}", e);
                log::warn!("Ideas: {}; showing sample data", message);

                let fallback = sample_ideas();
                {
                    let mut state = self.state.lock();
                    state.error = Some(message.clone());
                    state.summary = CommitteeSummary {
                        committee_id: None,
                        idea_count: fallback.len(),
                    };
                    state.data = fallback.clone();
                    state.degraded = true;
                    state.last_loaded_at = Some(Utc::now());
                }
                self.publish(Action::SetIdeas(fallback));
                self.publish(Action::SetErrors(vec![message]));
                false
            }
        }
    }

    pub async fn refetch(&self) -> bool {
        self.fetch().await
    }

    /// Ask the backend to change an idea's status; on success patch the
    /// local copy. Never fails outward: returns whether the change went
    /// through.
    pub async fn update_idea_status(
        &self,
        idea_id: &EntityId,
        status: impl Into<IdeaStatus>,
    ) -> bool {
        let status = status.into();
        match self.api.update_idea_status(idea_id, &status).await {
            Ok(()) => {
                let updates = IdeaUpdates::status(status.clone());
                {
                    let mut state = self.state.lock();
                    if let Some(idea) = state.data.iter_mut().find(|i| &i.idea_id == idea_id) {
                        updates.apply_to(idea);
                    }
                }
                self.publish(Action::UpdateIdea {
                    idea_id: idea_id.clone(),
                    updates,
                });
                log::info!("Ideas: {} -> {}", idea_id, status);
                true
            }
            Err(e) => {
                log::warn!("Ideas: status update for {} failed: {}", idea_id, e);
                false
            }
        }
    }

    fn publish(&self, action: Action) {
        if let Some(dispatcher) = &self.dispatcher {
            dispatcher.dispatch(action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockCall, MockDashboardApi};
    use crate::state::{DashboardState, Store};
    use crate::types::IdeaListResponse;
    use serde_json::json;
    use std::time::Duration;

    fn live_ideas() -> IdeaListResponse {
        serde_json::from_value(json!({
            "ideas": [
                { "idea_id": 1, "title": "Bike sharing", "status": "pending" },
                { "idea_id": 2, "title": "Rooftop garden", "status": "in_review" },
                { "idea_id": 3, "title": "Open data portal", "status": "pending" }
            ],
            "committee_id": 12
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_stores_ideas_and_summary() {
        let mock = Arc::new(MockDashboardApi::new());
        mock.set_ideas(live_ideas());
        let loader = IdeaListLoader::new(mock.clone());

        assert!(loader.fetch().await);

        let snapshot = loader.snapshot();
        assert_eq!(snapshot.data.len(), 3);
        assert_eq!(snapshot.summary.committee_id, Some(EntityId::from(12)));
        assert_eq!(snapshot.summary.idea_count, 3);
        assert!(!snapshot.loading);
        assert!(snapshot.error.is_none());
        assert!(!snapshot.degraded);
        assert!(snapshot.last_loaded_at.is_some());
    }

    #[tokio::test]
    async fn test_failed_fetch_falls_back_to_samples() {
        let mock = Arc::new(MockDashboardApi::new());
        mock.fail_ideas(Some("connection refused"));
        let store = Store::spawn(DashboardState::default());
        let loader = IdeaListLoader::new(mock.clone()).with_dispatcher(store.dispatcher());

        assert!(!loader.fetch().await);

        let snapshot = loader.snapshot();
        let ids: Vec<_> = snapshot.data.iter().map(|i| i.idea_id.clone()).collect();
        assert_eq!(ids, vec![EntityId::from("IDEA-001"), EntityId::from("IDEA-002")]);
        let error = snapshot.error.unwrap();
        assert!(!error.is_empty());
        assert!(error.contains("connection refused"));
        assert!(!snapshot.loading);
        assert!(snapshot.degraded);
        assert!(snapshot.summary.committee_id.is_none());

        store.flush().await;
        let shared = store.snapshot();
        assert_eq!(shared.ideas.len(), 2);
        assert_eq!(shared.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_refetch_clears_previous_error() {
        let mock = Arc::new(MockDashboardApi::new());
        mock.fail_ideas(Some("timeout"));
        let store = Store::spawn(DashboardState::default());
        let loader = IdeaListLoader::new(mock.clone()).with_dispatcher(store.dispatcher());
        loader.fetch().await;
        assert!(loader.snapshot().error.is_some());
        store.flush().await;
        assert_eq!(store.snapshot().errors.len(), 1);

        mock.fail_ideas(None);
        mock.set_ideas(live_ideas());
        assert!(loader.refetch().await);

        let snapshot = loader.snapshot();
        assert!(snapshot.error.is_none());
        assert!(!snapshot.degraded);
        assert_eq!(snapshot.data.len(), 3);
        assert_eq!(mock.count_calls(|c| *c == MockCall::ListIdeas), 2);

        store.flush().await;
        let shared = store.snapshot();
        assert_eq!(shared.ideas.len(), 3);
        assert!(shared.errors.is_empty());
    }

    #[tokio::test]
    async fn test_successful_fetch_leaves_other_errors_alone() {
        let mock = Arc::new(MockDashboardApi::new());
        mock.set_ideas(live_ideas());
        let store = Store::spawn(DashboardState::default());
        store.dispatch(Action::SetErrors(vec!["Meeting link missing".to_string()]));
        let loader = IdeaListLoader::new(mock.clone()).with_dispatcher(store.dispatcher());

        assert!(loader.fetch().await);
        store.flush().await;
        assert_eq!(store.snapshot().errors, vec!["Meeting link missing".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_is_visible_while_in_flight() {
        let mock = Arc::new(MockDashboardApi::new());
        mock.fail_ideas(Some("old failure"));
        let loader = Arc::new(IdeaListLoader::new(mock.clone()));
        loader.fetch().await;
        mock.push_ideas_response(Duration::from_secs(2), Ok(live_ideas()));

        let pending = tokio::spawn({
            let loader = loader.clone();
            async move { loader.fetch().await }
        });
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        let during = loader.snapshot();
        assert!(during.loading);
        assert!(during.error.is_none());

        assert!(pending.await.unwrap());
        assert!(!loader.snapshot().loading);
    }

    #[tokio::test]
    async fn test_update_status_patches_only_target() {
        let mock = Arc::new(MockDashboardApi::new());
        mock.set_ideas(live_ideas());
        let store = Store::spawn(DashboardState::default());
        let loader = IdeaListLoader::new(mock.clone()).with_dispatcher(store.dispatcher());
        loader.fetch().await;
        let before = loader.snapshot().data;

        assert!(loader.update_idea_status(&EntityId::from(1), "approved").await);

        let after = loader.snapshot().data;
        assert_eq!(after[0].status, IdeaStatus::Approved);
        assert_eq!(after[0].title, before[0].title);
        assert_eq!(after[1], before[1]);
        assert_eq!(after[2], before[2]);

        store.flush().await;
        assert_eq!(store.snapshot().ideas[0].status, IdeaStatus::Approved);
    }

    #[tokio::test]
    async fn test_update_status_failure_returns_false() {
        let mock = Arc::new(MockDashboardApi::new());
        mock.set_ideas(live_ideas());
        let loader = IdeaListLoader::new(mock.clone());
        loader.fetch().await;

        mock.reject_status_updates(Some("Idea is locked"));
        assert!(!loader.update_idea_status(&EntityId::from(2), "approved").await);
        assert_eq!(loader.snapshot().data[1].status, IdeaStatus::InReview);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_earlier_fetch_overwrites_newer_one() {
        // Known gap: no request generation guard, last resolver wins.
        let mock = Arc::new(MockDashboardApi::new());
        let stale = IdeaListResponse {
            ideas: vec![],
            committee_id: Some(EntityId::from(1)),
        };
        mock.push_ideas_response(Duration::from_secs(5), Ok(stale));
        mock.push_ideas_response(Duration::from_secs(1), Ok(live_ideas()));
        let loader = Arc::new(IdeaListLoader::new(mock.clone()));

        let first = tokio::spawn({
            let loader = loader.clone();
            async move { loader.fetch().await }
        });
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        assert_eq!(mock.count_calls(|c| *c == MockCall::ListIdeas), 1);
        let second = tokio::spawn({
            let loader = loader.clone();
            async move { loader.refetch().await }
        });

        second.await.unwrap();
        assert_eq!(loader.snapshot().data.len(), 3);
        first.await.unwrap();
        assert!(loader.snapshot().data.is_empty());
        assert!(!loader.snapshot().loading);
    }
}
