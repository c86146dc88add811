//! Loading/error tracking around one-off backend calls.

use std::future::Future;

use parking_lot::Mutex;

use super::LoadingGuard;
use crate::error::DashboardError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallState {
    pub loading: bool,
    /// User-facing message from the last failed call.
    pub error: Option<String>,
}

#[derive(Default)]
pub struct ApiCall {
    state: Mutex<CallState>,
}

impl ApiCall {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn snapshot(&self) -> CallState {
        self.state.lock().clone()
    }

    /// Run `operation`, tracking loading and recording a displayable error.
    /// The error is still returned to the caller.
    pub async fn invoke<T, F, Fut>(&self, operation: F) -> Result<T, DashboardError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, DashboardError>>,
    {
        let _loading = LoadingGuard::begin(
            &self.state,
            |s| {
                s.loading = true;
                s.error = None;
            },
            |s| s.loading = false,
        );

        let result = operation().await;
        if let Err(e) = &result {
            log::warn!("API call failed: {}", e);
            self.state.lock().error = Some(e.user_message());
        }
        result
    }
}
