//! Presentation sink that prints to the terminal.

use std::sync::Arc;

use caratsync_core::models::HogBugEntry;
use caratsync_core::{FieldId, PresentationSink, ReportCache};
use chrono::Local;
use tracing::debug;

/// Number of hogs/bugs listed after a change.
const TOP_ENTRIES: usize = 3;

pub struct TerminalSink {
    cache: Arc<ReportCache>,
}

impl TerminalSink {
    pub fn new(cache: Arc<ReportCache>) -> Self {
        Self { cache }
    }

    fn print_entries(kind: &str, entries: Option<Arc<Vec<HogBugEntry>>>) {
        let Some(entries) = entries else {
            println!("{} {}: none", timestamp(), kind);
            return;
        };
        println!("{} {}: {}", timestamp(), kind, entries.len());
        for line in top_entries(&entries) {
            println!("    {}", line);
        }
    }
}

fn timestamp() -> String {
    Local::now().format("[%H:%M:%S]").to_string()
}

fn field_label(field: FieldId) -> &'static str {
    match field {
        FieldId::Score => "J-Score",
        FieldId::Updated => "Last sync",
        FieldId::BatteryLife => "Battery life",
    }
}

/// The entries with the largest benefit, formatted one per line.
pub fn top_entries(entries: &[HogBugEntry]) -> Vec<String> {
    let mut ranked: Vec<&HogBugEntry> = entries.iter().collect();
    ranked.sort_by(|a, b| b.benefit().total_cmp(&a.benefit()));
    ranked
        .into_iter()
        .take(TOP_ENTRIES)
        .map(|e| format!("{} (+{:.0}%)", e.display_name(), e.benefit() * 100.0))
        .collect()
}

impl PresentationSink for TerminalSink {
    fn set_text(&self, field: FieldId, text: &str) {
        println!("{} {}: {}", timestamp(), field_label(field), text);
    }

    fn notify_actions_changed(&self) {
        debug!("Actions changed");
    }

    fn notify_bugs_changed(&self) {
        Self::print_entries("Bugs", self.cache.get_bug_report());
    }

    fn notify_hogs_changed(&self) {
        Self::print_entries("Hogs", self.cache.get_hog_report());
    }
}
