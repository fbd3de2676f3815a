//! HTTP client for the report service.
//!
//! The service exposes three JSON documents under a base URL: `reports`,
//! `hogs` and `bugs`. A `204 No Content` answer means the server has nothing
//! for that document yet.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::models::{HogBugReport, ReportBundle, ReportSet};

use super::{FetchError, RemoteClient};

// ============================================================================
// Constants
// ============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const REPORTS_PATH: &str = "reports";
const HOGS_PATH: &str = "hogs";
const BUGS_PATH: &str = "bugs";

/// HTTP client for the report service.
pub struct HttpReportClient {
    client: RwLock<Client>,
    base_url: Url,
    device_id: Option<String>,
    timeout: Duration,
}

impl HttpReportClient {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| FetchError::InvalidResponse(format!("Invalid server URL {}: {}", base_url, e)))?;

        // Url::join replaces the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client: RwLock::new(Self::build_client(timeout)?),
            base_url,
            device_id: None,
            timeout,
        })
    }

    /// Identify this device to the server on every request.
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn build_client(timeout: Duration) -> Result<Client, FetchError> {
        Ok(Client::builder().timeout(timeout).build()?)
    }

    fn current_client(&self) -> Client {
        // Cheap clone, shares connection pool
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn document_url(&self, path: &str) -> Result<Url, FetchError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| FetchError::InvalidResponse(format!("Invalid document path {}: {}", path, e)))?;
        if let Some(ref device_id) = self.device_id {
            url.query_pairs_mut().append_pair("uuid", device_id);
        }
        Ok(url)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(FetchError::from_status(status, &body))
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, FetchError> {
        let url = self.document_url(path)?;
        let response = self
            .current_client()
            .get(url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        if response.status() == StatusCode::NO_CONTENT {
            debug!(%url, "No content");
            return Ok(None);
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| FetchError::InvalidResponse(format!("Failed to parse {}: {}", path, e)))
    }
}

#[async_trait]
impl RemoteClient for HttpReportClient {
    async fn refresh_all_reports(&self) -> Result<ReportBundle, FetchError> {
        let (reports, hogs, bugs) = tokio::try_join!(
            self.get::<ReportSet>(REPORTS_PATH),
            self.get::<HogBugReport>(HOGS_PATH),
            self.get::<HogBugReport>(BUGS_PATH),
        )?;

        debug!(
            reports = reports.is_some(),
            hogs = hogs.is_some(),
            bugs = bugs.is_some(),
            "Fetched report documents"
        );
        Ok(ReportBundle { reports, hogs, bugs })
    }

    async fn reset_connection(&self) {
        match Self::build_client(self.timeout) {
            Ok(client) => {
                *self.client.write().unwrap_or_else(PoisonError::into_inner) = client;
                debug!("HTTP connection pool reset");
            }
            Err(e) => warn!(error = %e, "Failed to rebuild HTTP client, keeping the old one"),
        }
    }
}
