//! Conversion of raw hog/bug payloads into their stored form.
//!
//! Two normalizations are applied to every item:
//! - the package name loses any trailing `:process` qualifier
//! - every numeric series drops its zero-valued points

use crate::models::{HogBugEntry, HogsBugs};

/// Convert a raw hog or bug list into normalized entries.
///
/// An absent list stays absent (it is not the same as an empty list: the
/// caller uses absence to keep whatever it had before). Entry order follows
/// input order.
pub fn convert_hog_bug_list(raw: Option<&[HogsBugs]>, is_bug: bool) -> Option<Vec<HogBugEntry>> {
    let raw = raw?;
    Some(raw.iter().map(|item| convert_item(item, is_bug)).collect())
}

fn convert_item(item: &HogsBugs, is_bug: bool) -> HogBugEntry {
    HogBugEntry {
        app_name: item.app_name.as_deref().map(canonicalize_name),
        app_label: item.app_label.clone(),
        app_priority: item.app_priority.clone(),
        is_bug,
        expected_value: item.expected_value,
        expected_value_without: item.expected_value_without,
        w_distance: item.w_distance,
        x_vals: convert_series(item.x_vals.as_deref()),
        y_vals: convert_series(item.y_vals.as_deref()),
        x_vals_without: convert_series(item.x_vals_without.as_deref()),
        y_vals_without: convert_series(item.y_vals_without.as_deref()),
    }
}

/// Drop every point exactly equal to zero, keeping the order of the rest.
/// An absent series becomes an empty one.
pub fn convert_series(values: Option<&[f64]>) -> Vec<f64> {
    values
        .unwrap_or_default()
        .iter()
        .copied()
        .filter(|v| *v != 0.0)
        .collect()
}

/// Strip everything from the last `:` onward.
///
/// A name whose only colon is the leading character is returned whole, as is
/// a name with no colon at all.
pub fn canonicalize_name(name: &str) -> String {
    match name.rfind(':') {
        Some(idx) if idx > 0 => name[..idx].to_string(),
        _ => name.to_string(),
    }
}
