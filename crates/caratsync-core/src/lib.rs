//! caratsync core - client-side cache and refresh scheduler for Carat reports.
//!
//! The crate keeps a device's energy reports available offline:
//!
//! - [`codec`] normalizes raw hog/bug items received from the report service
//! - [`cache`] persists entities as files and keeps reclaimable in-memory copies
//! - [`scheduler`] periodically refreshes the cache from a [`api::RemoteClient`]
//!   and publishes derived values to a [`presentation::PresentationSink`]

pub mod api;
pub mod cache;
pub mod codec;
pub mod config;
pub mod models;
pub mod network;
pub mod presentation;
pub mod scheduler;
pub mod utils;

pub use api::{FetchError, HttpReportClient, RemoteClient};
pub use cache::{CacheOptions, DataStore, EntityKind, ReportCache, StoreError};
pub use config::SyncConfig;
pub use network::{NetworkStatus, NetworkStatusOracle};
pub use presentation::{DeviceSummary, FieldId, PresentationSink};
pub use scheduler::{RefreshScheduler, RefreshSettings, SchedulerHandle, SchedulerState};
