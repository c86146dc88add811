//! Fixed-interval background refresh with an explicit teardown handle.
//!
//! `spawn_interval` runs `tick` once immediately and then every `interval`
//! until the returned `PollHandle` is stopped or dropped. A tick that is in
//! flight when the handle stops is allowed to finish; no new tick starts
//! afterwards.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub struct PollHandle {
    name: &'static str,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Signal the loop to end. Returns true only for the call that actually
    /// tore the poller down.
    pub fn stop(&mut self) -> bool {
        match self.task.take() {
            Some(_) => {
                let _ = self.shutdown.send(true);
                log::info!("{} poller: stopped", self.name);
                true
            }
            None => false,
        }
    }

    /// Stop and wait for the loop (including an in-flight tick) to finish.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            let _ = self.shutdown.send(true);
            if let Err(e) = task.await {
                log::warn!("{} poller: task ended abnormally: {}", self.name, e);
            }
            log::info!("{} poller: shut down", self.name);
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

pub fn spawn_interval<F, Fut>(name: &'static str, interval: Duration, mut tick: F) -> PollHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (shutdown, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        log::info!("{} poller: started ({:?} interval)", name, interval);

        loop {
            tokio::select! {
                biased;
                changed = shutdown_rx.changed() => {
                    // Err means the handle is gone, which also ends the loop.
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    log::debug!("{} poller: tick", name);
                    tick().await;
                }
            }
        }
    });

    PollHandle {
        name,
        shutdown,
        task: Some(task),
    }
}
