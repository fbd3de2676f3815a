//! Network status as seen by the refresh scheduler.
//!
//! Detecting connectivity is platform business; the scheduler only consumes
//! an injected [`NetworkStatusOracle`].

use std::fmt;

use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkStatus {
    Connected,
    /// A link is coming up (e.g. Wi-Fi associating); worth re-checking soon.
    Connecting,
    Disconnected,
}

impl fmt::Display for NetworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NetworkStatus::Connected => "connected",
            NetworkStatus::Connecting => "connecting",
            NetworkStatus::Disconnected => "disconnected",
        };
        f.write_str(s)
    }
}

#[async_trait]
pub trait NetworkStatusOracle: Send + Sync + 'static {
    async fn status(&self) -> NetworkStatus;
}

/// Oracle that always reports the same status.
#[derive(Debug, Clone, Copy)]
pub struct FixedNetworkStatus(pub NetworkStatus);

#[async_trait]
impl NetworkStatusOracle for FixedNetworkStatus {
    async fn status(&self) -> NetworkStatus {
        self.0
    }
}
