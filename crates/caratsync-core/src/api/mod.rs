//! Remote report service boundary.
//!
//! This module defines the `RemoteClient` trait the refresh scheduler drives,
//! the `FetchError` it reports, and `HttpReportClient`, the reqwest-based
//! implementation used by the command-line front end.

pub mod client;
pub mod error;
pub mod remote;

pub use client::HttpReportClient;
pub use error::FetchError;
pub use remote::RemoteClient;
