//! Age-based directory sweep.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::policy::RetentionPolicy;

/// A child of the swept directory, as seen at listing time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: PathBuf,
    pub last_modified_at: DateTime<Utc>,
    pub is_dir: bool,
}

/// Outcome of one sweep.
///
/// Both lists follow directory listing order, which is up to the OS. Names are
/// converted lossily, so a non-UTF-8 name is reported with replacement
/// characters and may not match the name on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepResult {
    /// Entries removed by this sweep.
    pub deleted: Vec<String>,
    /// Entries whose removal was attempted and failed.
    pub failed: Vec<String>,
}

impl SweepResult {
    /// True when nothing was eligible.
    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty() && self.failed.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Deletes the direct children of a directory that are older than a policy allows.
#[derive(Debug, Clone)]
pub struct RetentionSweeper {
    policy: RetentionPolicy,
}

impl RetentionSweeper {
    pub fn new(policy: RetentionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// Sweep against the current time.
    pub fn sweep(&self) -> SweepResult {
        self.sweep_at(Utc::now())
    }

    /// Sweep as if the current time were `now`.
    ///
    /// A missing or non-directory root yields an empty result. Failures on
    /// single entries are recorded and never stop the scan.
    pub fn sweep_at(&self, now: DateTime<Utc>) -> SweepResult {
        let root = self.policy.root_path();
        let cutoff = self.policy.cutoff(now);
        let mut result = SweepResult::default();

        let Some(entries) = list_entries(root) else {
            debug!(root = %root.display(), "sweep root is not a readable directory");
            return result;
        };

        for entry in entries {
            if entry.last_modified_at >= cutoff {
                continue;
            }
            match remove_entry(&entry) {
                Ok(()) => {
                    debug!(entry = %entry.name, "entry deleted");
                    result.deleted.push(entry.name);
                }
                Err(e) => {
                    debug!(entry = %entry.name, error = %e, "entry deletion failed");
                    result.failed.push(entry.name);
                }
            }
        }

        result
    }
}

/// Sweep `policy.root_path()` against the current time.
pub fn sweep(policy: &RetentionPolicy) -> SweepResult {
    RetentionSweeper::new(policy.clone()).sweep()
}

/// List the direct children of `root`.
///
/// `None` when `root` is missing, not a directory or unreadable. Entries whose
/// metadata cannot be read are reported as last modified at the epoch, so a
/// sweep will try (and usually fail) to delete them.
pub fn list_entries(root: &Path) -> Option<Vec<DirectoryEntry>> {
    if !root.is_dir() {
        return None;
    }
    let read_dir = fs::read_dir(root).ok()?;

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "failed to read directory entry");
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        // DirEntry::metadata does not follow symlinks.
        let (last_modified_at, is_dir) = match entry.metadata() {
            Ok(meta) => (
                meta.modified()
                    .map(DateTime::<Utc>::from)
                    .unwrap_or(DateTime::UNIX_EPOCH),
                meta.is_dir(),
            ),
            Err(_) => (DateTime::UNIX_EPOCH, false),
        };

        entries.push(DirectoryEntry {
            name,
            path: entry.path(),
            last_modified_at,
            is_dir,
        });
    }

    Some(entries)
}

fn remove_entry(entry: &DirectoryEntry) -> io::Result<()> {
    if entry.is_dir {
        fs::remove_dir(&entry.path)
    } else {
        fs::remove_file(&entry.path)
    }
}
