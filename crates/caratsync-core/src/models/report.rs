//! Device report snapshot models.
//!
//! A `ReportSet` is replaced wholesale on every successful refresh and never
//! mutated in place, so it is shared behind an `Arc` once loaded.

use serde::{Deserialize, Serialize};

use super::{float, HogBugReport};

/// Statistics for one comparison group (this device model, this OS, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailReport {
    #[serde(default, with = "float::lossless")]
    pub score: f64,
    /// Expected battery drain rate, in percent per hour.
    #[serde(default, with = "float::lossless")]
    pub expected_value: f64,
    #[serde(default, with = "float::lossless")]
    pub expected_value_without: f64,
    #[serde(default, with = "float::lossless")]
    pub error: f64,
    #[serde(default, with = "float::lossless")]
    pub error_without: f64,
    #[serde(default, with = "float::lossless_seq")]
    pub x_vals: Vec<f64>,
    #[serde(default, with = "float::lossless_seq")]
    pub y_vals: Vec<f64>,
    #[serde(default, with = "float::lossless_seq")]
    pub x_vals_without: Vec<f64>,
    #[serde(default, with = "float::lossless_seq")]
    pub y_vals_without: Vec<f64>,
}

/// Full device report snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSet {
    /// Overall energy score in `[0, 1]`.
    #[serde(rename = "jScore", default, with = "float::lossless")]
    pub j_score: f64,
    #[serde(default)]
    pub model: DetailReport,
    #[serde(default)]
    pub os: DetailReport,
    #[serde(default)]
    pub similar_apps: DetailReport,
    #[serde(default)]
    pub changes_since_last_week: Vec<String>,
    #[serde(rename = "jScoreWith", default)]
    pub j_score_with: Option<DetailReport>,
    #[serde(rename = "jScoreWithout", default)]
    pub j_score_without: Option<DetailReport>,
}

impl ReportSet {
    /// Expected drain rate of this device model, in percent per hour.
    pub fn expected_drain_per_hour(&self) -> f64 {
        self.model.expected_value
    }
}

/// Everything a single remote refresh produced.
///
/// Each part is optional: the server may omit any of them, in which case the
/// previously stored value stays in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportBundle {
    #[serde(default)]
    pub reports: Option<ReportSet>,
    #[serde(default)]
    pub hogs: Option<HogBugReport>,
    #[serde(default)]
    pub bugs: Option<HogBugReport>,
}

impl ReportBundle {
    pub fn is_empty(&self) -> bool {
        self.reports.is_none() && self.hogs.is_none() && self.bugs.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_report_set_wire_names() {
        let json = r#"{"jScore": 0.873, "model": {"score": 0.5, "expectedValue": 25.0, "xVals": [1.0, 2.0]}, "changesSinceLastWeek": ["a"]}"#;

        let reports: ReportSet =
            serde_json::from_str(json).expect("Failed to parse report test JSON");
        assert_eq!(reports.j_score, 0.873);
        assert_eq!(reports.expected_drain_per_hour(), 25.0);
        assert_eq!(reports.model.x_vals, vec![1.0, 2.0]);
        assert_eq!(reports.os, DetailReport::default());
        assert!(reports.j_score_with.is_none());
    }

    #[test]
    fn test_bundle_is_empty() {
        assert!(ReportBundle::default().is_empty());

        let bundle = ReportBundle {
            reports: Some(ReportSet::default()),
            ..Default::default()
        };
        assert!(!bundle.is_empty());
    }
}
