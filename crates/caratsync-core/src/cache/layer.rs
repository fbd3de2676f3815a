//! In-memory cache in front of the persistent store.
//!
//! One reclaimable slot per entity kind. Reads are served from memory when
//! the slot is live and reloaded from disk otherwise; writes go to disk first
//! and then swap the slot (write-through).

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::codec::convert_hog_bug_list;
use crate::models::{Freshness, HogBugEntry, HogBugReport, ReportBundle, ReportSet};

use super::slot::CacheSlot;
use super::store::{DataStore, EntityKind};

/// Default time a cached value stays resident without being accessed.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy)]
pub struct CacheOptions {
    /// How long an unused value stays strongly held before a sweep makes it
    /// reclaimable.
    pub idle_ttl: Duration,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            idle_ttl: DEFAULT_IDLE_TTL,
        }
    }
}

pub struct ReportCache {
    store: DataStore,
    reports: CacheSlot<ReportSet>,
    bugs: CacheSlot<Vec<HogBugEntry>>,
    hogs: CacheSlot<Vec<HogBugEntry>>,
    freshness: AtomicI64,
}

impl ReportCache {
    /// Build the cache and warm it from whatever is already on disk.
    /// Missing or unreadable files simply leave the slot empty.
    pub fn open(store: DataStore, options: CacheOptions) -> Self {
        let freshness = store.read_freshness();
        let cache = Self {
            reports: CacheSlot::new(options.idle_ttl),
            bugs: CacheSlot::new(options.idle_ttl),
            hogs: CacheSlot::new(options.idle_ttl),
            freshness: AtomicI64::new(freshness.as_millis()),
            store,
        };

        let warmed = [
            cache.get_reports().is_some(),
            cache.get_bug_report().is_some(),
            cache.get_hog_report().is_some(),
        ];
        debug!(
            freshness = freshness.as_millis(),
            reports = warmed[0],
            bugs = warmed[1],
            hogs = warmed[2],
            "Cache warmed from disk"
        );
        cache
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    // ===== Reads =====

    pub fn get_reports(&self) -> Option<Arc<ReportSet>> {
        self.reports.get_or_load(|| self.store.read_reports())
    }

    pub fn get_bug_report(&self) -> Option<Arc<Vec<HogBugEntry>>> {
        self.bugs.get_or_load(|| self.store.read_bug_entries())
    }

    pub fn get_hog_report(&self) -> Option<Arc<Vec<HogBugEntry>>> {
        self.hogs.get_or_load(|| self.store.read_hog_entries())
    }

    pub fn get_freshness(&self) -> Freshness {
        Freshness::from_millis(self.freshness.load(Ordering::Acquire))
    }

    // ===== Writes =====

    pub fn put_reports(&self, reports: ReportSet) {
        self.store.write_reports(&reports);
        self.reports.put(Arc::new(reports));
    }

    pub fn put_bug_entries(&self, entries: Vec<HogBugEntry>) {
        self.store.write_bug_entries(&entries);
        self.bugs.put(Arc::new(entries));
    }

    pub fn put_hog_entries(&self, entries: Vec<HogBugEntry>) {
        self.store.write_hog_entries(&entries);
        self.hogs.put(Arc::new(entries));
    }

    /// Normalize and store a raw bug report. A report without a list leaves
    /// the previous bugs in place; returns whether anything was written.
    pub fn write_bug_report(&self, report: &HogBugReport) -> bool {
        match convert_hog_bug_list(report.hb_list.as_deref(), true) {
            Some(entries) => {
                self.put_bug_entries(entries);
                true
            }
            None => false,
        }
    }

    /// Normalize and store a raw hog report. See [`Self::write_bug_report`].
    pub fn write_hog_report(&self, report: &HogBugReport) -> bool {
        match convert_hog_bug_list(report.hb_list.as_deref(), false) {
            Some(entries) => {
                self.put_hog_entries(entries);
                true
            }
            None => false,
        }
    }

    /// Record a successful sync now. The in-memory value never moves
    /// backwards even if the wall clock does.
    pub fn write_freshness(&self) -> Freshness {
        let written = self.store.write_freshness();
        self.freshness
            .fetch_max(written.as_millis(), Ordering::AcqRel);
        written
    }

    /// Store every part of a successful refresh, then stamp freshness.
    pub fn apply_refresh(&self, bundle: ReportBundle) -> Freshness {
        let has_reports = bundle.reports.is_some();
        if let Some(reports) = bundle.reports {
            self.put_reports(reports);
        }
        let bugs = bundle
            .bugs
            .as_ref()
            .is_some_and(|report| self.write_bug_report(report));
        let hogs = bundle
            .hogs
            .as_ref()
            .is_some_and(|report| self.write_hog_report(report));

        let freshness = self.write_freshness();
        info!(
            reports = has_reports,
            bugs,
            hogs,
            freshness = freshness.as_millis(),
            "Refresh stored"
        );
        freshness
    }

    // ===== Memory management =====

    /// Make idle values reclaimable. Returns the number of slots demoted.
    pub fn sweep(&self) -> usize {
        let demoted = [self.reports.sweep(), self.bugs.sweep(), self.hogs.sweep()]
            .iter()
            .filter(|&&d| d)
            .count();
        if demoted > 0 {
            debug!(demoted, "Idle cache slots made reclaimable");
        }
        demoted
    }

    pub fn invalidate(&self, kind: EntityKind) {
        match kind {
            EntityKind::Reports => self.reports.invalidate(),
            EntityKind::Bugs => self.bugs.invalidate(),
            EntityKind::Hogs => self.hogs.invalidate(),
        }
    }

    pub fn invalidate_all(&self) {
        for kind in EntityKind::ALL {
            self.invalidate(kind);
        }
    }

    /// True if the value for `kind` is currently held in memory.
    pub fn is_resident(&self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Reports => self.reports.is_resident(),
            EntityKind::Bugs => self.bugs.is_resident(),
            EntityKind::Hogs => self.hogs.is_resident(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DetailReport, HogsBugs};
    use crate::test_support::scratch_dir;

    fn open_cache(dir: &std::path::Path, idle_ttl: Duration) -> ReportCache {
        let store = DataStore::new(dir).expect("store should open");
        ReportCache::open(store, CacheOptions { idle_ttl })
    }

    fn reports_with_score(j_score: f64) -> ReportSet {
        ReportSet {
            j_score,
            model: DetailReport {
                expected_value: 25.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn raw_report(names: &[&str]) -> HogBugReport {
        HogBugReport {
            hb_list: Some(
                names
                    .iter()
                    .map(|name| HogsBugs {
                        app_name: Some(name.to_string()),
                        x_vals: Some(vec![0.0, 4.0]),
                        ..Default::default()
                    })
                    .collect(),
            ),
        }
    }

    #[test]
    fn test_empty_cache() {
        let cache = open_cache(&scratch_dir(), DEFAULT_IDLE_TTL);
        assert!(cache.get_reports().is_none());
        assert!(cache.get_bug_report().is_none());
        assert!(cache.get_hog_report().is_none());
        assert!(cache.get_freshness().is_never());
    }

    #[test]
    fn test_put_is_write_through() {
        let dir = scratch_dir();
        let cache = open_cache(&dir, DEFAULT_IDLE_TTL);
        cache.put_reports(reports_with_score(0.5));

        assert_eq!(cache.get_reports().map(|r| r.j_score), Some(0.5));
        assert_eq!(cache.store().read_reports().map(|r| r.j_score), Some(0.5));

        // A fresh process sees the value too
        let reopened = open_cache(&dir, DEFAULT_IDLE_TTL);
        assert_eq!(reopened.get_reports().map(|r| r.j_score), Some(0.5));
    }

    #[test]
    fn test_round_trip_after_invalidate() {
        let cache = open_cache(&scratch_dir(), DEFAULT_IDLE_TTL);
        let reports = reports_with_score(0.7);
        cache.put_reports(reports.clone());
        assert!(cache.write_hog_report(&raw_report(&["com.hog:bg"])));

        cache.invalidate_all();
        assert!(!cache.is_resident(EntityKind::Reports));

        assert_eq!(cache.get_reports().as_deref(), Some(&reports));
        let hogs = cache.get_hog_report().expect("hogs reload from disk");
        assert_eq!(hogs[0].app_name.as_deref(), Some("com.hog"));
        assert_eq!(hogs[0].x_vals, vec![4.0]);
        assert!(cache.is_resident(EntityKind::Hogs));
    }

    #[test]
    fn test_reclaimed_slot_reloads_from_store() {
        let cache = open_cache(&scratch_dir(), Duration::ZERO);
        cache.put_reports(reports_with_score(0.1));

        // Change the file behind the cache's back
        cache.store().write_reports(&reports_with_score(0.9));
        assert_eq!(cache.get_reports().map(|r| r.j_score), Some(0.1));

        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.get_reports().map(|r| r.j_score), Some(0.9));
    }

    #[test]
    fn test_non_finite_values_reload_after_sweep() {
        let cache = open_cache(&scratch_dir(), Duration::ZERO);
        let mut reports = reports_with_score(0.5);
        reports.model.error = f64::INFINITY;
        cache.put_reports(reports);

        let mut raw = raw_report(&["com.hog"]);
        if let Some(list) = raw.hb_list.as_mut() {
            list[0].w_distance = f64::NAN;
        }
        assert!(cache.write_hog_report(&raw));

        assert_eq!(cache.sweep(), 2);
        assert!(!cache.is_resident(EntityKind::Reports));

        let reports = cache.get_reports().expect("reports reload from disk");
        assert_eq!(reports.j_score, 0.5);
        assert_eq!(reports.model.error, f64::INFINITY);
        let hogs = cache.get_hog_report().expect("hogs reload from disk");
        assert!(hogs[0].w_distance.is_nan());
    }

    #[test]
    fn test_held_value_survives_sweep() {
        let cache = open_cache(&scratch_dir(), Duration::ZERO);
        cache.put_reports(reports_with_score(0.1));
        let held = cache.get_reports().expect("reports present");

        cache.store().write_reports(&reports_with_score(0.9));
        cache.sweep();

        // Still referenced by a reader, so the slot serves the same value
        assert!(Arc::ptr_eq(&held, &cache.get_reports().expect("reports present")));
    }

    #[test]
    fn test_bug_report_without_list_keeps_previous() {
        let cache = open_cache(&scratch_dir(), DEFAULT_IDLE_TTL);
        assert!(cache.write_bug_report(&raw_report(&["com.bug"])));
        assert!(!cache.write_bug_report(&HogBugReport::default()));

        let bugs = cache.get_bug_report().expect("bugs present");
        assert_eq!(bugs.len(), 1);
        assert!(bugs[0].is_bug);
        assert!(cache.get_hog_report().is_none());
    }

    #[test]
    fn test_apply_refresh() {
        let dir = scratch_dir();
        let cache = open_cache(&dir, DEFAULT_IDLE_TTL);
        let bundle = ReportBundle {
            reports: Some(reports_with_score(0.873)),
            hogs: Some(raw_report(&["com.hog"])),
            bugs: Some(raw_report(&["com.bug:remote", "com.bug2"])),
        };

        let freshness = cache.apply_refresh(bundle);
        assert!(!freshness.is_never());
        assert_eq!(cache.get_freshness(), freshness);

        let reopened = open_cache(&dir, DEFAULT_IDLE_TTL);
        assert_eq!(reopened.get_freshness(), freshness);
        assert_eq!(reopened.get_reports().map(|r| r.j_score), Some(0.873));
        assert_eq!(reopened.get_bug_report().map(|b| b.len()), Some(2));
        assert!(reopened.get_hog_report().is_some_and(|h| !h[0].is_bug));
    }

    #[test]
    fn test_empty_refresh_still_stamps_freshness() {
        let cache = open_cache(&scratch_dir(), DEFAULT_IDLE_TTL);
        cache.put_reports(reports_with_score(0.2));

        let freshness = cache.apply_refresh(ReportBundle::default());
        assert!(!freshness.is_never());
        assert_eq!(cache.get_reports().map(|r| r.j_score), Some(0.2));
    }

    #[test]
    fn test_concurrent_readers_see_whole_values() {
        let cache = Arc::new(open_cache(&scratch_dir(), Duration::ZERO));
        cache.put_reports(reports_with_score(0.0));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let reports = cache.get_reports().expect("reports always present");
                        assert_eq!(reports.model.expected_value, 25.0);
                        cache.sweep();
                    }
                })
            })
            .collect();

        for i in 0..50 {
            cache.put_reports(reports_with_score(i as f64 / 100.0));
        }
        for reader in readers {
            reader.join().expect("reader thread panicked");
        }
    }
}
