//! Ideaboard session runner.
//!
//! Drives the dashboard core without a UI: loads the idea list and
//! committee, keeps notifications polling, and logs every store change
//! until Ctrl-C.
//!
//! Usage: `ideaboard [--offline]`. `--offline` uses the in-memory demo
//! backend instead of the configured API.

use std::sync::Arc;

use ideaboard_lib::api::client::HttpDashboardApi;
use ideaboard_lib::api::credentials::FileCredentials;
use ideaboard_lib::api::mock::MockDashboardApi;
use ideaboard_lib::api::DashboardApi;
use ideaboard_lib::config::{load_config, DashboardConfig};
use ideaboard_lib::hooks::committee::CommitteeLoader;
use ideaboard_lib::hooks::ideas::IdeaListLoader;
use ideaboard_lib::hooks::notifications::NotificationSync;
use ideaboard_lib::state::{DashboardState, Store};

fn build_api(config: &DashboardConfig, offline: bool) -> anyhow::Result<Arc<dyn DashboardApi>> {
    if offline {
        log::info!("Using offline demo backend");
        return Ok(Arc::new(MockDashboardApi::demo()));
    }

    let token_path = config
        .resolved_token_path()
        .map_err(|e| anyhow::anyhow!("Failed to resolve token path: {e}"))?;
    let api = HttpDashboardApi::new(config, Arc::new(FileCredentials::new(token_path)))?
        .with_auth_expired_hook(Arc::new(|| {
            log::warn!("Session expired; sign in again to refresh the token file");
        }));
    log::info!("Using backend at {}", api.base_url());
    Ok(Arc::new(api))
}

fn describe(state: &DashboardState) -> String {
    format!(
        "tab={} ideas={} selected={} errors={}",
        state.active_tab.as_str(),
        state.ideas.len(),
        state
            .selected_idea
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".to_string()),
        state.errors.len()
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let offline = std::env::args().skip(1).any(|arg| arg == "--offline");
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?;
    let api = build_api(&config, offline)?;

    let store = Store::spawn(DashboardState::default());
    let mut snapshots = store.subscribe();

    let ideas = IdeaListLoader::new(api.clone()).with_dispatcher(store.dispatcher());
    let committee = CommitteeLoader::new(api.clone()).with_dispatcher(store.dispatcher());
    tokio::join!(ideas.fetch(), committee.fetch());
    if let Some(error) = ideas.snapshot().error {
        log::warn!("{}", error);
    }

    let notifications = Arc::new(NotificationSync::new(api));
    notifications.mount(config.poll_interval());

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut report = tokio::time::interval(config.poll_interval());
    let mut last_unread = None;

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = snapshots.borrow_and_update().clone();
                log::info!("State: {}", describe(&state));
            }
            _ = report.tick() => {
                let unread = notifications.snapshot().unread_count;
                if last_unread != Some(unread) {
                    log::info!("Notifications: {} unread", unread);
                    last_unread = Some(unread);
                }
            }
            _ = &mut shutdown => {
                log::info!("Shutting down");
                break;
            }
        }
    }

    notifications.unmount();
    let final_state = store.shutdown().await;
    log::info!("Final state: {}", describe(&final_state));
    Ok(())
}
