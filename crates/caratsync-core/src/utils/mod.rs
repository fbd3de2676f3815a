//! Utility functions for formatting presentation values.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{format_elapsed, format_hms};
