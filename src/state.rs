//! Dashboard entity store.
//!
//! `DashboardState` is a plain value; `Store` owns the live copy inside a
//! single task and applies dispatched actions strictly in arrival order.
//! Every applied action that changes the state publishes a new snapshot.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::reducer::{reduce, Action};
use crate::types::{
    BmcRecord, CommitteeInfo, DashboardTab, EntityId, GanttChart, Idea, Meeting, MeetingPopup,
};

/// Everything the dashboard renders from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardState {
    pub active_tab: DashboardTab,
    pub ideas: Vec<Idea>,
    pub bmcs: Vec<BmcRecord>,
    pub selected_idea: Option<EntityId>,
    pub selected_meeting: Option<EntityId>,
    pub show_meeting_popup: bool,
    pub show_idea_details: bool,
    pub loading: bool,
    pub committee_info: Option<CommitteeInfo>,
    pub meeting_popup: Option<MeetingPopup>,
    pub gantt: Option<GanttChart>,
    pub success_message: String,
    pub errors: Vec<String>,
}

impl DashboardState {
    pub fn idea(&self, idea_id: &EntityId) -> Option<&Idea> {
        self.ideas.iter().find(|i| &i.idea_id == idea_id)
    }

    /// The idea the user selected. Ideas are never removed, so this only
    /// misses when the selection was made before the list arrived.
    pub fn selected_idea(&self) -> Option<&Idea> {
        self.selected_idea.as_ref().and_then(|id| self.idea(id))
    }

    /// The selected meeting, looked up in the selected idea first.
    pub fn selected_meeting(&self) -> Option<&Meeting> {
        let meeting_id = self.selected_meeting.as_ref()?;
        if let Some(found) = self
            .selected_idea()
            .and_then(|idea| find_meeting(idea, meeting_id))
        {
            return Some(found);
        }
        self.ideas
            .iter()
            .find_map(|idea| find_meeting(idea, meeting_id))
    }

    pub fn bmc_for(&self, idea_id: &EntityId) -> Option<&BmcRecord> {
        self.bmcs.iter().find(|b| &b.idea_id == idea_id)
    }

    pub fn has_messages(&self) -> bool {
        !self.success_message.is_empty() || !self.errors.is_empty()
    }
}

fn find_meeting<'a>(idea: &'a Idea, meeting_id: &EntityId) -> Option<&'a Meeting> {
    idea.meetings
        .as_ref()?
        .iter()
        .find(|m| &m.meeting_id == meeting_id)
}

enum Command {
    Dispatch(Action),
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// Cloneable handle for sending actions to a running `Store`.
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Command>,
}

impl Dispatcher {
    /// Queue an action. Returns false once the store has shut down.
    pub fn dispatch(&self, action: Action) -> bool {
        let kind = action.kind();
        if self.tx.send(Command::Dispatch(action)).is_err() {
            log::warn!("Store: dropped {} after shutdown", kind);
            return false;
        }
        true
    }

    /// Wait until every action queued before this call has been applied.
    pub async fn flush(&self) -> bool {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(ack_tx)).is_err() {
            return false;
        }
        ack_rx.await.is_ok()
    }
}

/// Owner of the live dashboard state.
pub struct Store {
    dispatcher: Dispatcher,
    snapshots: watch::Receiver<Arc<DashboardState>>,
    task: JoinHandle<DashboardState>,
}

impl Store {
    /// Spawn the store task on the current tokio runtime.
    pub fn spawn(initial: DashboardState) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(initial.clone()));
        let task = tokio::spawn(run_store(initial, rx, snapshot_tx));

        Self {
            dispatcher: Dispatcher { tx },
            snapshots: snapshot_rx,
            task,
        }
    }

    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    pub fn dispatch(&self, action: Action) -> bool {
        self.dispatcher.dispatch(action)
    }

    pub async fn flush(&self) -> bool {
        self.dispatcher.flush().await
    }

    /// Latest published state.
    pub fn snapshot(&self) -> Arc<DashboardState> {
        self.snapshots.borrow().clone()
    }

    /// Receiver that wakes on every published change.
    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardState>> {
        self.snapshots.clone()
    }

    /// Stop the task after draining already-queued actions and return the
    /// final state.
    pub async fn shutdown(self) -> DashboardState {
        let _ = self.dispatcher.tx.send(Command::Shutdown);
        match self.task.await {
            Ok(state) => state,
            Err(e) => {
                log::warn!("Store: task ended abnormally: {}", e);
                self.snapshots.borrow().as_ref().clone()
            }
        }
    }
}

async fn run_store(
    initial: DashboardState,
    mut rx: mpsc::UnboundedReceiver<Command>,
    snapshot_tx: watch::Sender<Arc<DashboardState>>,
) -> DashboardState {
    let mut current = initial;
    let mut applied: u64 = 0;

    while let Some(command) = rx.recv().await {
        match command {
            Command::Dispatch(action) => {
                let kind = action.kind();
                let next = reduce(&current, action);
                applied += 1;
                if next != current {
                    current = next;
                    snapshot_tx.send_replace(Arc::new(current.clone()));
                    log::debug!("Store: applied {} (#{})", kind, applied);
                } else {
                    log::debug!("Store: {} left state unchanged (#{})", kind, applied);
                }
            }
            Command::Flush(ack) => {
                let _ = ack.send(());
            }
            Command::Shutdown => break,
        }
    }

    log::info!("Store: stopped after {} actions", applied);
    current
}
