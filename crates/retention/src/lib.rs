//! Age-based cleanup of a single directory.
//!
//! One sweep lists the direct children of a directory, deletes every entry
//! last modified before `now - max_age_days`, and reports per-entry outcomes.
//! Nothing is kept between sweeps.

pub mod policy;
pub mod sweeper;

pub use policy::RetentionPolicy;
pub use sweeper::{DirectoryEntry, RetentionSweeper, SweepResult, list_entries, sweep};
