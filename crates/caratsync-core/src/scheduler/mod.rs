//! Background refresh scheduler.
//!
//! A single long-lived task that, on every tick, checks the network, tries to
//! refresh the reports from the remote service, publishes the derived
//! presentation values, and then sleeps. The sleep is short while the network
//! is still coming up and long otherwise; [`SchedulerHandle::wake_now`] cuts
//! it short and [`SchedulerHandle::stop`] ends the loop after the current
//! tick.

mod handle;
mod worker;

use std::time::Duration;

use thiserror::Error;

use crate::network::NetworkStatus;

pub use handle::{SchedulerHandle, WakeHandle};
pub use worker::RefreshScheduler;

/// Timing and retry knobs for the refresh loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSettings {
    /// Total refresh tries per tick, including the first one.
    pub fetch_attempts: u32,
    /// Sleep while the network reports `Connecting`.
    pub wifi_wait: Duration,
    /// Sleep after every other tick.
    pub freshness_timeout: Duration,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            fetch_attempts: 2,
            wifi_wait: Duration::from_secs(10),
            freshness_timeout: Duration::from_secs(30 * 60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulerState {
    /// Constructed, loop not yet running.
    Idle,
    /// Querying the network oracle.
    Checking,
    /// Talking to the remote service.
    Fetching,
    /// Short sleep waiting for the network to come up.
    WaitingForNetwork,
    /// Regular sleep until the next tick.
    Sleeping,
    /// Loop has exited. Terminal.
    Stopped,
}

/// What the last completed tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickOutcome {
    /// Fresh data was fetched and stored.
    Refreshed,
    /// Every attempt failed; the cache keeps its previous contents.
    FetchFailed,
    /// Connected, but no remote client is configured.
    NoRemote,
    /// Network not usable this tick.
    Skipped(NetworkStatus),
}

/// Snapshot published by the loop on every state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerStatus {
    pub state: SchedulerState,
    /// Number of ticks fully completed, post-processing included.
    pub ticks: u64,
    pub last_outcome: Option<TickOutcome>,
}

impl Default for SchedulerStatus {
    fn default() -> Self {
        Self {
            state: SchedulerState::Idle,
            ticks: 0,
            last_outcome: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Refresh loop task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
