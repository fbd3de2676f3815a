//! Data models for Carat report entities.
//!
//! This module contains both the raw shapes received from the remote service
//! and the normalized shapes kept in local storage:
//!
//! - `ReportSet`, `DetailReport`: the device report snapshot
//! - `HogsBugs`, `HogBugReport`: raw hog/bug items as delivered by the server
//! - `HogBugEntry`: a normalized hog or bug, produced by the codec
//! - `Freshness`: time of the last successful synchronization

pub mod float;
pub mod freshness;
pub mod hogbug;
pub mod report;

pub use freshness::Freshness;
pub use hogbug::{HogBugEntry, HogBugReport, HogsBugs};
pub use report::{DetailReport, ReportBundle, ReportSet};
