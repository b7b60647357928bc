//! Deployment status polling.
//!
//! [`DeploymentWatcher`] fetches a deployment, hands the snapshot to the
//! caller, and (when following) waits a fixed interval before fetching again.
//! It stops after a terminal snapshot (`completed` or `failed`), after the
//! first fetch error, or when its cancellation token fires. Cancellation is
//! checked before every fetch and interrupts the wait.

use crate::error::Result;
use crate::types::Deployment;
use async_trait::async_trait;
use futures::Stream;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Interval between status fetches while following a deployment.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Where the watcher reads deployment state from.
#[async_trait]
pub trait DeploymentSource: Send + Sync {
    /// Fetch the current state of a deployment.
    async fn fetch_deployment(&self, deployment_id: &str) -> Result<Deployment>;
}

/// Timer used between polls. Swap it out to test without real delays.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchState {
    /// Nothing fetched yet.
    Initial,
    /// Last snapshot was non-terminal; wait before the next fetch.
    Waiting,
    Done,
}

/// Polls a deployment until it reaches a terminal state.
///
/// Build one with `client.deployments().watch(id)`. By default the watcher
/// follows the deployment every [`DEFAULT_POLL_INTERVAL`]; with
/// `follow(false)` it yields a single snapshot.
pub struct DeploymentWatcher {
    source: Arc<dyn DeploymentSource>,
    deployment_id: String,
    interval: Duration,
    follow: bool,
    cancel: CancellationToken,
    sleeper: Arc<dyn Sleeper>,
    state: WatchState,
}

impl std::fmt::Debug for DeploymentWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeploymentWatcher")
            .field("deployment_id", &self.deployment_id)
            .field("interval", &self.interval)
            .field("follow", &self.follow)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl DeploymentWatcher {
    /// Create a watcher over any [`DeploymentSource`].
    pub fn new(source: Arc<dyn DeploymentSource>, deployment_id: impl Into<String>) -> Self {
        Self {
            source,
            deployment_id: deployment_id.into(),
            interval: DEFAULT_POLL_INTERVAL,
            follow: true,
            cancel: CancellationToken::new(),
            sleeper: Arc::new(TokioSleeper),
            state: WatchState::Initial,
        }
    }

    /// Set the wait between fetches.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Keep polling after the first snapshot (default: true).
    pub fn follow(mut self, follow: bool) -> Self {
        self.follow = follow;
        self
    }

    /// Stop watching when `token` is cancelled.
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Use a custom timer between polls.
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// The token that stops this watcher. Cancel it from another task to stop.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The deployment being watched.
    pub fn deployment_id(&self) -> &str {
        &self.deployment_id
    }

    /// Fetch the next snapshot.
    ///
    /// Returns `None` once watching is over: after a terminal snapshot, after
    /// a single snapshot when not following, after an error, or once
    /// cancelled.
    pub async fn next(&mut self) -> Option<Result<Deployment>> {
        match self.state {
            WatchState::Done => return None,
            WatchState::Initial => {}
            WatchState::Waiting => {
                let cancelled = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => true,
                    _ = self.sleeper.sleep(self.interval) => false,
                };
                if cancelled {
                    debug!(deployment_id = %self.deployment_id, "watch cancelled while waiting");
                    self.state = WatchState::Done;
                    return None;
                }
            }
        }

        if self.cancel.is_cancelled() {
            debug!(deployment_id = %self.deployment_id, "watch cancelled");
            self.state = WatchState::Done;
            return None;
        }

        match self.source.fetch_deployment(&self.deployment_id).await {
            Ok(deployment) => {
                debug!(
                    deployment_id = %self.deployment_id,
                    status = %deployment.status,
                    stage = deployment.current_stage.as_deref().unwrap_or(""),
                    "deployment snapshot"
                );
                self.state = if !self.follow || deployment.status.is_terminal() {
                    WatchState::Done
                } else {
                    WatchState::Waiting
                };
                Some(Ok(deployment))
            }
            Err(e) => {
                self.state = WatchState::Done;
                Some(Err(e))
            }
        }
    }

    /// Poll until watching ends, calling `on_update` with every snapshot.
    ///
    /// Returns the last snapshot, or `None` if cancelled before the first
    /// fetch. A fetch error stops the loop and is returned.
    pub async fn wait_for_terminal<F>(mut self, mut on_update: F) -> Result<Option<Deployment>>
    where
        F: FnMut(&Deployment),
    {
        let mut last = None;
        while let Some(snapshot) = self.next().await {
            let deployment = snapshot?;
            on_update(&deployment);
            last = Some(deployment);
        }
        Ok(last)
    }

    /// Adapt the watcher into a [`Stream`] of snapshots.
    pub fn into_stream(self) -> impl Stream<Item = Result<Deployment>> + Send {
        futures::stream::unfold(self, |mut watcher| async move {
            let item = watcher.next().await?;
            Some((item, watcher))
        })
    }
}
