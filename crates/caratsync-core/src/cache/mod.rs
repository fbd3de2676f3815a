//! Local caching module for offline data access.
//!
//! This module provides the `DataStore` for persisting report entities as
//! files and the `ReportCache` that keeps the most recently loaded value of
//! each entity in memory. Cached entity kinds:
//! - Reports (device report snapshot)
//! - Bugs and Hogs (normalized app lists)
//! - Freshness (time of the last successful sync)

pub mod error;
pub mod layer;
pub mod slot;
pub mod store;

pub use error::StoreError;
pub use layer::{CacheOptions, ReportCache};
pub use slot::CacheSlot;
pub use store::{DataStore, EntityKind};
