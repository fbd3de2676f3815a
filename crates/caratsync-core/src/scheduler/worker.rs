use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use tokio::sync::{watch, Notify};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{FetchError, RemoteClient};
use crate::cache::ReportCache;
use crate::network::{NetworkStatus, NetworkStatusOracle};
use crate::presentation::{DeviceSummary, PresentationSink};

use super::handle::{SchedulerHandle, WakeHandle};
use super::{RefreshSettings, SchedulerState, SchedulerStatus, TickOutcome};

/// How long to sleep after a tick.
enum Pause {
    WifiWait,
    FreshnessTimeout,
}

/// Refresh loop with its collaborators. Consumed by [`RefreshScheduler::start`];
/// a stopped loop cannot be restarted.
pub struct RefreshScheduler {
    cache: Arc<ReportCache>,
    network: Arc<dyn NetworkStatusOracle>,
    remote: Option<Arc<dyn RemoteClient>>,
    sink: Arc<dyn PresentationSink>,
    settings: RefreshSettings,
}

impl RefreshScheduler {
    pub fn new(
        cache: Arc<ReportCache>,
        network: Arc<dyn NetworkStatusOracle>,
        sink: Arc<dyn PresentationSink>,
        settings: RefreshSettings,
    ) -> Self {
        Self {
            cache,
            network,
            remote: None,
            sink,
            settings,
        }
    }

    pub fn with_remote_client(mut self, remote: Arc<dyn RemoteClient>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Spawn the loop on the current Tokio runtime.
    pub fn start(self) -> SchedulerHandle {
        let notify = Arc::new(Notify::new());
        let shutdown = CancellationToken::new();
        let (status_tx, status_rx) = watch::channel(SchedulerStatus::default());

        let worker = Worker {
            scheduler: self,
            wake: Arc::clone(&notify),
            shutdown: shutdown.clone(),
            status_tx,
        };
        let task = tokio::spawn(worker.run());

        SchedulerHandle::new(WakeHandle::new(notify), shutdown, status_rx, task)
    }

    /// Push the derived presentation values to the sink and notify it that
    /// the action, bug and hog views should re-render.
    pub fn publish_report_data(&self) {
        let reports = self.cache.get_reports();
        let freshness = self.cache.get_freshness();
        let summary = DeviceSummary::compute(
            reports.as_deref(),
            freshness,
            Utc::now().timestamp_millis(),
        );
        debug!(
            score = summary.score,
            freshness = freshness.as_millis(),
            has_reports = reports.is_some(),
            "Publishing report data"
        );

        summary.publish(self.sink.as_ref());
        self.sink.notify_actions_changed();
        self.sink.notify_bugs_changed();
        self.sink.notify_hogs_changed();
    }

    /// Try the remote refresh up to the configured number of times, resetting
    /// the connection after each failure. Returns true once data is stored.
    async fn refresh_with_retries(&self, remote: &dyn RemoteClient) -> bool {
        let attempts = self.settings.fetch_attempts.max(1);

        for attempt in 1..=attempts {
            // A misbehaving client must never take the loop down with it
            let result = AssertUnwindSafe(remote.refresh_all_reports())
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(FetchError::from_panic(payload)));

            match result {
                Ok(bundle) => {
                    self.cache.apply_refresh(bundle);
                    info!(attempt, "Reports refreshed");
                    return true;
                }
                Err(e) => {
                    if attempt < attempts {
                        warn!(attempt, error = %e, "Failed to refresh reports, trying again now");
                    } else {
                        warn!(
                            attempt,
                            error = %e,
                            retry_in_secs = self.settings.freshness_timeout.as_secs(),
                            "Failed to refresh reports, will try again later"
                        );
                    }

                    if AssertUnwindSafe(remote.reset_connection())
                        .catch_unwind()
                        .await
                        .is_err()
                    {
                        warn!(attempt, "Connection reset panicked");
                    }
                }
            }
        }
        false
    }
}

struct Worker {
    scheduler: RefreshScheduler,
    wake: Arc<Notify>,
    shutdown: CancellationToken,
    status_tx: watch::Sender<SchedulerStatus>,
}

impl Worker {
    fn set_state(&self, state: SchedulerState) {
        self.status_tx.send_modify(|status| status.state = state);
    }

    async fn run(self) {
        info!(
            attempts = self.scheduler.settings.fetch_attempts,
            wifi_wait_secs = self.scheduler.settings.wifi_wait.as_secs(),
            freshness_timeout_secs = self.scheduler.settings.freshness_timeout.as_secs(),
            "Refresh loop started"
        );

        while !self.shutdown.is_cancelled() {
            let (outcome, pause) = self.tick().await;

            // Regardless of the outcome
            self.scheduler.cache.sweep();
            self.scheduler.publish_report_data();
            self.status_tx.send_modify(|status| {
                status.ticks += 1;
                status.last_outcome = Some(outcome);
            });

            if self.shutdown.is_cancelled() {
                break;
            }

            let (state, duration) = match pause {
                Pause::WifiWait => (
                    SchedulerState::WaitingForNetwork,
                    self.scheduler.settings.wifi_wait,
                ),
                Pause::FreshnessTimeout => (
                    SchedulerState::Sleeping,
                    self.scheduler.settings.freshness_timeout,
                ),
            };
            self.set_state(state);
            self.sleep(duration).await;
        }

        self.set_state(SchedulerState::Stopped);
        info!("Refresh loop stopped");
    }

    async fn tick(&self) -> (TickOutcome, Pause) {
        self.set_state(SchedulerState::Checking);
        let status = self.scheduler.network.status().await;

        match (status, &self.scheduler.remote) {
            (NetworkStatus::Connected, Some(remote)) => {
                self.set_state(SchedulerState::Fetching);
                let outcome = if self.scheduler.refresh_with_retries(remote.as_ref()).await {
                    TickOutcome::Refreshed
                } else {
                    TickOutcome::FetchFailed
                };
                (outcome, Pause::FreshnessTimeout)
            }
            (NetworkStatus::Connected, None) => {
                warn!(
                    retry_in_secs = self.scheduler.settings.freshness_timeout.as_secs(),
                    "Connected but no remote client configured"
                );
                (TickOutcome::NoRemote, Pause::FreshnessTimeout)
            }
            (NetworkStatus::Connecting, _) => {
                warn!(
                    %status,
                    retry_in_secs = self.scheduler.settings.wifi_wait.as_secs(),
                    "Network not ready yet"
                );
                (TickOutcome::Skipped(status), Pause::WifiWait)
            }
            (NetworkStatus::Disconnected, _) => {
                warn!(
                    %status,
                    retry_in_secs = self.scheduler.settings.freshness_timeout.as_secs(),
                    "Network unavailable"
                );
                (TickOutcome::Skipped(status), Pause::FreshnessTimeout)
            }
        }
    }

    /// Sleep for `duration`, or less if woken or stopped.
    async fn sleep(&self, duration: Duration) {
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = self.wake.notified() => {
                debug!("Woken before the scheduled tick");
            }
            _ = self.shutdown.cancelled() => {}
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
