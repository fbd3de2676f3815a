//! Derived presentation values and the sink that displays them.
//!
//! After every scheduler tick the current report and freshness are turned
//! into three display strings (score, last update, battery life) and pushed to
//! a [`PresentationSink`], followed by change notifications for the action,
//! bug and hog views.

use std::fmt;

use crate::models::{Freshness, ReportSet};
use crate::utils::{format_elapsed, format_hms};

/// Battery percentage that the expected drain rate is divided into.
const FULL_CHARGE_PERCENT: f64 = 100.0;

const SECS_PER_HOUR: f64 = 3600.0;

const NEVER_UPDATED: &str = "(Never updated)";

/// Display fields owned by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    Score,
    Updated,
    BatteryLife,
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldId::Score => "score",
            FieldId::Updated => "updated",
            FieldId::BatteryLife => "battery_life",
        };
        f.write_str(s)
    }
}

/// Receiver of display updates. Calls are fire-and-forget.
pub trait PresentationSink: Send + Sync + 'static {
    fn set_text(&self, field: FieldId, text: &str);
    fn notify_actions_changed(&self);
    fn notify_bugs_changed(&self);
    fn notify_hogs_changed(&self);
}

/// Display values derived from the cached report and freshness.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSummary {
    /// Energy score in percent, truncated.
    pub score: i64,
    /// Expected battery life in seconds; zero when unknown.
    pub battery_life_secs: f64,
    /// Milliseconds since the last successful sync; `None` if never synced.
    pub age_millis: Option<i64>,
}

impl DeviceSummary {
    /// Derive the summary at wall-clock time `now_millis`.
    pub fn compute(reports: Option<&ReportSet>, freshness: Freshness, now_millis: i64) -> Self {
        let (score, battery_life_secs) = match reports {
            Some(r) => {
                let drain = r.expected_drain_per_hour();
                let battery_hours = if drain > 0.0 {
                    FULL_CHARGE_PERCENT / drain
                } else {
                    0.0
                };
                ((r.j_score * 100.0) as i64, battery_hours * SECS_PER_HOUR)
            }
            None => (0, 0.0),
        };

        Self {
            score,
            battery_life_secs,
            age_millis: freshness.age_millis(now_millis),
        }
    }

    pub fn score_text(&self) -> String {
        self.score.to_string()
    }

    pub fn updated_text(&self) -> String {
        match self.age_millis {
            Some(age) => format!("(Updated {} ago)", format_elapsed(age)),
            None => NEVER_UPDATED.to_string(),
        }
    }

    pub fn battery_life_text(&self) -> String {
        format_hms(self.battery_life_secs)
    }

    /// Push every field to `sink`.
    pub fn publish(&self, sink: &dyn PresentationSink) {
        sink.set_text(FieldId::Score, &self.score_text());
        sink.set_text(FieldId::Updated, &self.updated_text());
        sink.set_text(FieldId::BatteryLife, &self.battery_life_text());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DetailReport;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        texts: Mutex<Vec<(FieldId, String)>>,
    }

    impl PresentationSink for RecordingSink {
        fn set_text(&self, field: FieldId, text: &str) {
            self.texts
                .lock()
                .expect("sink lock")
                .push((field, text.to_string()));
        }
        fn notify_actions_changed(&self) {}
        fn notify_bugs_changed(&self) {}
        fn notify_hogs_changed(&self) {}
    }

    fn reports(expected_value: f64, j_score: f64) -> ReportSet {
        ReportSet {
            j_score,
            model: DetailReport {
                expected_value,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_never_updated_without_reports() {
        let summary = DeviceSummary::compute(None, Freshness::NEVER, 1_000_000);
        assert_eq!(summary.updated_text(), "(Never updated)");
        assert_eq!(summary.battery_life_text(), "0h 0m 0s");
        assert_eq!(summary.score_text(), "0");
    }

    #[test]
    fn test_battery_life_and_score() {
        let r = reports(25.0, 0.873);
        let summary = DeviceSummary::compute(Some(&r), Freshness::NEVER, 0);
        assert_eq!(summary.battery_life_text(), "4h 0m 0s");
        assert_eq!(summary.score, 87);
    }

    #[test]
    fn test_battery_life_carries_remainders() {
        // 100 / 30 = 3.333.. hours
        let r = reports(30.0, 0.5);
        let summary = DeviceSummary::compute(Some(&r), Freshness::NEVER, 0);
        assert_eq!(summary.battery_life_text(), "3h 20m 0s");

        let r = reports(7.0, 0.5);
        // 100 / 7 = 14.2857 h = 14h 17m 8s
        let summary = DeviceSummary::compute(Some(&r), Freshness::NEVER, 0);
        assert_eq!(summary.battery_life_text(), "14h 17m 8s");
    }

    #[test]
    fn test_non_positive_drain_means_no_estimate() {
        let r = reports(0.0, 0.42);
        let summary = DeviceSummary::compute(Some(&r), Freshness::NEVER, 0);
        assert_eq!(summary.battery_life_text(), "0h 0m 0s");
        assert_eq!(summary.score, 42);
    }

    #[test]
    fn test_freshness_age_without_reports() {
        let freshness = Freshness::from_millis(1_000_000);
        let summary = DeviceSummary::compute(None, freshness, 1_000_000 + 125_500);
        assert_eq!(summary.updated_text(), "(Updated 2m 5s ago)");
        assert_eq!(summary.score, 0);
    }

    #[test]
    fn test_publish_sets_every_field() {
        let sink = RecordingSink::default();
        let r = reports(25.0, 0.873);
        DeviceSummary::compute(Some(&r), Freshness::NEVER, 0).publish(&sink);

        let texts = sink.texts.lock().expect("sink lock");
        assert_eq!(
            *texts,
            vec![
                (FieldId::Score, "87".to_string()),
                (FieldId::Updated, "(Never updated)".to_string()),
                (FieldId::BatteryLife, "4h 0m 0s".to_string()),
            ]
        );
    }
}
