use async_trait::async_trait;

use crate::models::ReportBundle;

use super::FetchError;

/// Source of fresh report data.
///
/// Implementations are driven by the refresh scheduler: one
/// `refresh_all_reports` call per attempt, and `reset_connection` after
/// every failed attempt.
#[async_trait]
pub trait RemoteClient: Send + Sync + 'static {
    /// Fetch the reports, hog list and bug list in one go.
    async fn refresh_all_reports(&self) -> Result<ReportBundle, FetchError>;

    /// Drop any pooled connection so the next attempt starts clean.
    async fn reset_connection(&self);
}
