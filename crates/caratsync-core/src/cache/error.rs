use std::path::PathBuf;

use thiserror::Error;

use super::EntityKind;

/// Failures inside the persistent store.
///
/// These never escape the public read/write paths: the store logs them and
/// degrades to "no data" instead.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not decode {name}: {source}")]
    Decode {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not encode {name}: {source}")]
    Encode {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Expected {expected:?} data in {name}, found {found:?}")]
    KindMismatch {
        name: &'static str,
        expected: EntityKind,
        found: EntityKind,
    },

    #[error("Invalid freshness value {0:?}")]
    InvalidFreshness(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the underlying file simply does not exist yet.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
