use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Time of the last successful synchronization, in milliseconds since the
/// Unix epoch. [`Freshness::NEVER`] (`-1`) means no sync has completed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Freshness(i64);

impl Freshness {
    pub const NEVER: Freshness = Freshness(-1);

    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Freshness stamped with the current wall-clock time.
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// True when no synchronization has ever been recorded.
    ///
    /// Zero is treated the same as the `-1` sentinel: no real sync can be
    /// stamped at the epoch.
    pub fn is_never(self) -> bool {
        self.0 <= 0
    }

    pub fn as_datetime(self) -> Option<DateTime<Utc>> {
        if self.is_never() {
            return None;
        }
        DateTime::from_timestamp_millis(self.0)
    }

    /// Milliseconds elapsed between this freshness and `now_millis`.
    /// Clock skew never yields a negative age.
    pub fn age_millis(self, now_millis: i64) -> Option<i64> {
        if self.is_never() {
            None
        } else {
            Some((now_millis - self.0).max(0))
        }
    }
}

impl Default for Freshness {
    fn default() -> Self {
        Self::NEVER
    }
}
