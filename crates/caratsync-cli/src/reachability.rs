//! Network oracle backed by a TCP probe of the report server.

use std::time::Duration;

use async_trait::async_trait;
use caratsync_core::{NetworkStatus, NetworkStatusOracle};
use reqwest::Url;
use tokio::net::TcpStream;
use tracing::debug;

/// Probe timeout; a slow handshake is reported as `Connecting`.
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TcpReachability {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpReachability {
    /// Probe the host and port of `server_url`.
    pub fn for_server(server_url: &str) -> anyhow::Result<Self> {
        let url = Url::parse(server_url)?;
        let host = url
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("Server URL has no host: {}", server_url))?
            .to_string();
        let port = url
            .port_or_known_default()
            .ok_or_else(|| anyhow::anyhow!("Server URL has no port: {}", server_url))?;

        Ok(Self {
            host,
            port,
            timeout: DEFAULT_PROBE_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl NetworkStatusOracle for TcpReachability {
    async fn status(&self) -> NetworkStatus {
        let connect = TcpStream::connect((self.host.as_str(), self.port));
        let status = match tokio::time::timeout(self.timeout, connect).await {
            Ok(Ok(_)) => NetworkStatus::Connected,
            Ok(Err(e)) => {
                debug!(host = %self.host, port = self.port, error = %e, "Probe failed");
                NetworkStatus::Disconnected
            }
            Err(_) => NetworkStatus::Connecting,
        };
        debug!(host = %self.host, port = self.port, %status, "Network probe");
        status
    }
}
