//! Hog and bug models.
//!
//! A "hog" is an app that drains more battery than average across all
//! devices; a "bug" is an app that drains more on this device than elsewhere.
//! Both arrive from the server in the same raw shape (`HogsBugs`) and are
//! normalized by [`crate::codec`] into `HogBugEntry`.

use serde::{Deserialize, Serialize};

use super::float;

/// Raw hog/bug item as delivered by the remote service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HogsBugs {
    #[serde(default)]
    pub app_name: Option<String>,
    #[serde(default)]
    pub app_label: Option<String>,
    #[serde(default)]
    pub app_priority: Option<String>,
    #[serde(default)]
    pub expected_value: f64,
    #[serde(default)]
    pub expected_value_without: f64,
    #[serde(rename = "wDistance", default)]
    pub w_distance: f64,
    #[serde(default)]
    pub x_vals: Option<Vec<f64>>,
    #[serde(default)]
    pub y_vals: Option<Vec<f64>>,
    #[serde(default)]
    pub x_vals_without: Option<Vec<f64>>,
    #[serde(default)]
    pub y_vals_without: Option<Vec<f64>>,
}

/// Raw hog or bug report. `hb_list` is absent when the server sent nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HogBugReport {
    #[serde(default)]
    pub hb_list: Option<Vec<HogsBugs>>,
}

/// Normalized hog or bug entry as kept in local storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HogBugEntry {
    /// Package name with any `:process` suffix removed.
    pub app_name: Option<String>,
    pub app_label: Option<String>,
    pub app_priority: Option<String>,
    pub is_bug: bool,
    #[serde(with = "float::lossless")]
    pub expected_value: f64,
    #[serde(with = "float::lossless")]
    pub expected_value_without: f64,
    #[serde(with = "float::lossless")]
    pub w_distance: f64,
    #[serde(with = "float::lossless_seq")]
    pub x_vals: Vec<f64>,
    #[serde(with = "float::lossless_seq")]
    pub y_vals: Vec<f64>,
    #[serde(with = "float::lossless_seq")]
    pub x_vals_without: Vec<f64>,
    #[serde(with = "float::lossless_seq")]
    pub y_vals_without: Vec<f64>,
}

impl HogBugEntry {
    /// Label for display, falling back to the package name.
    pub fn display_name(&self) -> &str {
        self.app_label
            .as_deref()
            .filter(|label| !label.is_empty())
            .or(self.app_name.as_deref())
            .unwrap_or("Unknown")
    }

    /// Relative drain increase caused by the app, as a fraction.
    pub fn benefit(&self) -> f64 {
        if self.expected_value_without <= 0.0 {
            return 0.0;
        }
        (self.expected_value - self.expected_value_without) / self.expected_value_without
    }
}
