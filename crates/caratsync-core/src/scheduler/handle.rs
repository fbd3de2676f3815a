use std::sync::Arc;

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{SchedulerError, SchedulerStatus};

/// Cheap, cloneable handle that cuts the scheduler's current sleep short.
///
/// Safe to use from any thread. A wake requested while the loop is busy is
/// remembered and ends the next sleep immediately; after the loop has stopped
/// it does nothing.
#[derive(Debug, Clone)]
pub struct WakeHandle {
    notify: Arc<Notify>,
}

impl WakeHandle {
    pub(crate) fn new(notify: Arc<Notify>) -> Self {
        Self { notify }
    }

    pub fn wake_now(&self) {
        debug!("Wake requested");
        self.notify.notify_one();
    }
}

/// Owner handle for a running refresh loop.
pub struct SchedulerHandle {
    waker: WakeHandle,
    shutdown: CancellationToken,
    status_rx: watch::Receiver<SchedulerStatus>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    pub(crate) fn new(
        waker: WakeHandle,
        shutdown: CancellationToken,
        status_rx: watch::Receiver<SchedulerStatus>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            waker,
            shutdown,
            status_rx,
            task,
        }
    }

    /// Start the next tick now instead of waiting out the current sleep.
    pub fn wake_now(&self) {
        self.waker.wake_now();
    }

    pub fn waker(&self) -> WakeHandle {
        self.waker.clone()
    }

    /// Latest published status.
    pub fn status(&self) -> SchedulerStatus {
        self.status_rx.borrow().clone()
    }

    /// Receiver that observes every status change.
    pub fn subscribe(&self) -> watch::Receiver<SchedulerStatus> {
        self.status_rx.clone()
    }

    /// Ask the loop to exit without waiting for it.
    ///
    /// An in-flight fetch is allowed to finish; the loop exits once the
    /// current tick's post-processing is done.
    pub fn request_stop(&self) {
        self.shutdown.cancel();
    }

    /// Stop the loop and wait for it to exit.
    pub async fn stop(self) -> Result<(), SchedulerError> {
        info!("Stopping refresh loop");
        self.shutdown.cancel();
        self.task.await?;
        Ok(())
    }
}
