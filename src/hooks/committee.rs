//! Loads the session's committee and hands it to the store.

use std::sync::Arc;

use parking_lot::Mutex;

use super::LoadingGuard;
use crate::api::DashboardApi;
use crate::reducer::Action;
use crate::state::Dispatcher;
use crate::types::CommitteeInfo;

#[derive(Debug, Clone, Default)]
pub struct CommitteeState {
    pub info: Option<CommitteeInfo>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct CommitteeLoader {
    api: Arc<dyn DashboardApi>,
    dispatcher: Option<Dispatcher>,
    state: Mutex<CommitteeState>,
}

impl CommitteeLoader {
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        Self {
            api,
            dispatcher: None,
            state: Mutex::new(CommitteeState::default()),
        }
    }

    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn snapshot(&self) -> CommitteeState {
        self.state.lock().clone()
    }

    pub async fn fetch(&self) -> bool {
        let _loading = LoadingGuard::begin(
            &self.state,
            |s| {
                s.loading = true;
                s.error = None;
            },
            |s| s.loading = false,
        );

        match self.api.get_committee_info().await {
            Ok(info) => {
                log::info!(
                    "Committee: {} ({} members)",
                    info.name,
                    info.members.len()
                );
                self.state.lock().info = Some(info.clone());
                if let Some(dispatcher) = &self.dispatcher {
                    dispatcher.dispatch(Action::SetCommitteeInfo(Some(info)));
                }
                true
            }
            Err(e) => {
                log::warn!("Committee: load failed: {}", e);
                self.state.lock().error = Some(e.user_message());
                false
            }
        }
    }
}
