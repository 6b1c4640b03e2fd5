use std::path::PathBuf;

/// Defaults the jobs fall back to when a launch does not override them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobsConfig {
    /// Directory swept by `delete-old-files`.
    pub cleanup_dir: PathBuf,
    /// Retention period for `delete-old-files`, in days.
    pub cleanup_max_age_days: u32,
    /// Items at or below this stock level are reported as low.
    pub low_stock_threshold: i64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            cleanup_dir: PathBuf::from("temp"),
            cleanup_max_age_days: 30,
            low_stock_threshold: 10,
        }
    }
}
