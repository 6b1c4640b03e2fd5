use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Which directory to sweep and how long entries may stay in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    root_path: PathBuf,
    max_age_days: u32,
}

impl RetentionPolicy {
    pub fn new(root_path: impl Into<PathBuf>, max_age_days: u32) -> Self {
        Self {
            root_path: root_path.into(),
            max_age_days,
        }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn max_age_days(&self) -> u32 {
        self.max_age_days
    }

    /// Entries modified strictly before this instant are eligible for deletion.
    ///
    /// A period reaching past the earliest representable instant clamps to it,
    /// so nothing is eligible.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(Duration::days(i64::from(self.max_age_days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}
