//! Notification synchronizer.
//!
//! Keeps the notification list and unread badge in step with the backend:
//! an immediate fetch plus fixed-interval refresh while mounted, and
//! read-acknowledgements that only touch local state once the backend has
//! confirmed them.

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::LoadingGuard;
use crate::api::DashboardApi;
use crate::poller::{spawn_interval, PollHandle};
use crate::types::{EntityId, Notification};

#[derive(Debug, Clone, Default)]
pub struct NotificationState {
    pub notifications: Vec<Notification>,
    /// Server-reported unread count, adjusted locally on confirmed reads.
    pub unread_count: u32,
    pub loading: bool,
    /// Whether the notification panel is open.
    pub visible: bool,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl NotificationState {
    /// Unread count derived from the list itself.
    pub fn recount_unread(&self) -> u32 {
        self.notifications.iter().filter(|n| !n.is_read).count() as u32
    }

    pub fn unread_ids(&self) -> Vec<EntityId> {
        self.notifications
            .iter()
            .filter(|n| !n.is_read)
            .map(|n| n.id.clone())
            .collect()
    }
}

pub struct NotificationSync {
    api: Arc<dyn DashboardApi>,
    state: Mutex<NotificationState>,
    poller: Mutex<Option<PollHandle>>,
}

impl NotificationSync {
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        Self {
            api,
            state: Mutex::new(NotificationState::default()),
            poller: Mutex::new(None),
        }
    }

    pub fn snapshot(&self) -> NotificationState {
        self.state.lock().clone()
    }

    /// Replace the list and unread count from the backend. Failures are
    /// logged and leave the previous list in place.
    pub async fn fetch(&self) -> bool {
        let _loading = LoadingGuard::begin(&self.state, |s| s.loading = true, |s| s.loading = false);

        match self.api.list_notifications().await {
            Ok(resp) => {
                log::debug!(
                    "Notifications: fetched {} ({} unread)",
                    resp.notifications.len(),
                    resp.count
                );
                let mut state = self.state.lock();
                state.notifications = resp.notifications;
                state.unread_count = resp.count;
                state.last_fetched_at = Some(Utc::now());
                true
            }
            Err(e) => {
                log::warn!("Notifications: fetch failed: {}", e);
                false
            }
        }
    }

    /// Acknowledge one notification. Local state changes only when the
    /// backend confirms; returns whether it did.
    pub async fn mark_as_read(&self, id: &EntityId) -> bool {
        match self.api.mark_notification_read(id).await {
            Ok(true) => {
                let mut state = self.state.lock();
                let was_unread = match state.notifications.iter_mut().find(|n| &n.id == id) {
                    Some(n) => !std::mem::replace(&mut n.is_read, true),
                    // Not in the local page; the server count still included it.
                    None => true,
                };
                if was_unread {
                    state.unread_count = state.unread_count.saturating_sub(1);
                }
                true
            }
            Ok(false) => {
                log::warn!("Notifications: backend did not confirm read for {}", id);
                false
            }
            Err(e) => {
                log::warn!("Notifications: mark read for {} failed: {}", id, e);
                false
            }
        }
    }

    /// Acknowledge every locally unread notification, one request at a
    /// time in list order. Returns how many were confirmed.
    pub async fn mark_all_as_read(&self) -> usize {
        let unread = self.state.lock().unread_ids();
        if unread.is_empty() {
            return 0;
        }

        let mut confirmed = 0;
        for id in &unread {
            if self.mark_as_read(id).await {
                confirmed += 1;
            }
        }
        log::info!(
            "Notifications: marked {}/{} as read",
            confirmed,
            unread.len()
        );
        confirmed
    }

    /// Flip panel visibility, refreshing when it opens. Returns the new
    /// visibility.
    pub async fn toggle(&self) -> bool {
        let visible = {
            let mut state = self.state.lock();
            state.visible = !state.visible;
            state.visible
        };
        if visible {
            self.fetch().await;
        }
        visible
    }

    /// Fetch now and then every `interval` until the returned handle is
    /// stopped or dropped. The poller does not keep `self` alive.
    pub fn start_polling(self: &Arc<Self>, interval: Duration) -> PollHandle {
        let weak: Weak<Self> = Arc::downgrade(self);
        spawn_interval("Notification", interval, move || {
            let weak = weak.clone();
            async move {
                if let Some(sync) = weak.upgrade() {
                    sync.fetch().await;
                }
            }
        })
    }

    /// Poll for the lifetime of the session. Mounting again replaces the
    /// running poller.
    pub fn mount(self: &Arc<Self>, interval: Duration) {
        let handle = self.start_polling(interval);
        let previous = self.poller.lock().replace(handle);
        if let Some(mut previous) = previous {
            previous.stop();
        }
    }

    /// Stop polling. Returns false when nothing was mounted.
    pub fn unmount(&self) -> bool {
        let handle = self.poller.lock().take();
        match handle {
            Some(mut handle) => handle.stop(),
            None => false,
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller.lock().as_ref().is_some_and(PollHandle::is_running)
    }
}
