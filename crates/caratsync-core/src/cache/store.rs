//! File-backed persistent store for report entities.
//!
//! Each entity kind lives in its own JSON file inside the data directory,
//! wrapped in an envelope recording the kind and the save time. Freshness is
//! kept separately as plain text.
//!
//! Every public operation is best-effort: I/O and decode failures are logged
//! and turn into "no data" rather than errors, so a corrupted file behaves
//! like a cold cache.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::models::{Freshness, HogBugEntry, ReportSet};

use super::StoreError;

/// Freshness file name in the data directory
const FRESHNESS_FILE: &str = "carat-freshness.txt";

/// The persisted entity kinds. Each maps to exactly one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Reports,
    Bugs,
    Hogs,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Reports, EntityKind::Bugs, EntityKind::Hogs];

    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Reports => "reports",
            EntityKind::Bugs => "bugs",
            EntityKind::Hogs => "hogs",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            EntityKind::Reports => "carat-reports.json",
            EntityKind::Bugs => "carat-bugs.json",
            EntityKind::Hogs => "carat-hogs.json",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntity<T> {
    kind: EntityKind,
    saved_at: DateTime<Utc>,
    data: T,
}

pub struct DataStore {
    data_dir: PathBuf,
}

impl DataStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir).map_err(|e| StoreError::io(&data_dir, e))?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn entity_path(&self, kind: EntityKind) -> PathBuf {
        self.data_dir.join(kind.file_name())
    }

    fn freshness_path(&self) -> PathBuf {
        self.data_dir.join(FRESHNESS_FILE)
    }

    // ===== Generic entity access =====

    /// Persist `value` under the file for `kind`. Failures are logged only.
    pub fn write_entity<T: Serialize>(&self, kind: EntityKind, value: &T) {
        if let Err(e) = self.save(kind, value) {
            warn!(entity = kind.name(), error = %e, "Failed to write entity");
        }
    }

    /// Load the value stored for `kind`.
    ///
    /// Returns `None` when the file is missing, unreadable, holds a different
    /// kind, or does not decode as `T`.
    pub fn read_entity<T: DeserializeOwned>(&self, kind: EntityKind) -> Option<T> {
        match self.load(kind) {
            Ok(stored) => {
                debug!(entity = kind.name(), saved_at = %stored.saved_at, "Entity read");
                Some(stored.data)
            }
            Err(e) if e.is_not_found() => {
                debug!(entity = kind.name(), "No stored entity");
                None
            }
            Err(e) => {
                warn!(entity = kind.name(), error = %e, "Failed to read entity");
                None
            }
        }
    }

    /// Time the stored entity was last written, if it can be read.
    pub fn saved_at(&self, kind: EntityKind) -> Option<DateTime<Utc>> {
        self.load::<serde_json::Value>(kind).ok().map(|s| s.saved_at)
    }

    fn load<T: DeserializeOwned>(&self, kind: EntityKind) -> Result<StoredEntity<T>, StoreError> {
        let path = self.entity_path(kind);
        let contents = std::fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;

        // Check the envelope before committing to the typed shape
        let stored: StoredEntity<serde_json::Value> = serde_json::from_str(&contents)
            .map_err(|source| StoreError::Decode {
                name: kind.file_name(),
                source,
            })?;

        if stored.kind != kind {
            return Err(StoreError::KindMismatch {
                name: kind.file_name(),
                expected: kind,
                found: stored.kind,
            });
        }

        let data = serde_json::from_value(stored.data).map_err(|source| StoreError::Decode {
            name: kind.file_name(),
            source,
        })?;

        Ok(StoredEntity {
            kind: stored.kind,
            saved_at: stored.saved_at,
            data,
        })
    }

    fn save<T: Serialize>(&self, kind: EntityKind, value: &T) -> Result<(), StoreError> {
        let stored = StoredEntity {
            kind,
            saved_at: Utc::now(),
            data: value,
        };
        let contents = serde_json::to_string(&stored).map_err(|source| StoreError::Encode {
            name: kind.file_name(),
            source,
        })?;
        write_atomic(&self.entity_path(kind), contents.as_bytes())
    }

    // ===== Reports =====

    pub fn write_reports(&self, reports: &ReportSet) {
        self.write_entity(EntityKind::Reports, reports);
    }

    pub fn read_reports(&self) -> Option<ReportSet> {
        self.read_entity(EntityKind::Reports)
    }

    // ===== Hogs and Bugs =====

    pub fn write_bug_entries(&self, entries: &[HogBugEntry]) {
        self.write_entity(EntityKind::Bugs, &entries);
    }

    pub fn read_bug_entries(&self) -> Option<Vec<HogBugEntry>> {
        self.read_entity(EntityKind::Bugs)
    }

    pub fn write_hog_entries(&self, entries: &[HogBugEntry]) {
        self.write_entity(EntityKind::Hogs, &entries);
    }

    pub fn read_hog_entries(&self) -> Option<Vec<HogBugEntry>> {
        self.read_entity(EntityKind::Hogs)
    }

    // ===== Freshness =====

    /// Stamp freshness with the current time, persist it, and return it.
    ///
    /// The returned value is valid even if persisting it failed.
    pub fn write_freshness(&self) -> Freshness {
        let freshness = Freshness::now();
        let path = self.freshness_path();
        if let Err(e) = write_atomic(&path, freshness.as_millis().to_string().as_bytes()) {
            warn!(error = %e, "Failed to write freshness");
        }
        freshness
    }

    /// Read the persisted freshness, or [`Freshness::NEVER`] if there is none.
    pub fn read_freshness(&self) -> Freshness {
        match self.load_freshness() {
            Ok(freshness) => {
                debug!(freshness = freshness.as_millis(), "Read freshness");
                freshness
            }
            Err(e) if e.is_not_found() => {
                debug!("No freshness recorded");
                Freshness::NEVER
            }
            Err(e) => {
                warn!(error = %e, "Failed to read freshness");
                Freshness::NEVER
            }
        }
    }

    fn load_freshness(&self) -> Result<Freshness, StoreError> {
        let path = self.freshness_path();
        let contents = std::fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
        let trimmed = contents.trim();
        trimmed
            .parse::<i64>()
            .map(Freshness::from_millis)
            .map_err(|_| StoreError::InvalidFreshness(trimmed.to_string()))
    }
}

/// Write `contents` to a scratch file next to `path`, then move it into place.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));

    // Unique name per writer, so concurrent writers never share a scratch file
    let mut temp_file = NamedTempFile::new_in(parent).map_err(|e| StoreError::io(parent, e))?;
    temp_file
        .write_all(contents)
        .map_err(|e| StoreError::io(temp_file.path(), e))?;
    temp_file
        .persist(path)
        .map_err(|e| StoreError::io(path, e.error))?;

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
