//! Cleanup jobs: old files in a directory, old records in a store.

use std::path::PathBuf;

use serde_json::json;
use tracing::{info, warn};

use sysbatch_core::{BatchError, BatchResult};
use sysbatch_engine::{
    Job, JobBuilder, JobParameters, RepeatStatus, StepBuilder, StepContext, Tasklet,
};
use sysbatch_retention::{RetentionPolicy, RetentionSweeper};

use crate::config::JobsConfig;

pub const DELETE_OLD_FILES_JOB: &str = "delete-old-files";
pub const DELETE_OLD_FILES_STEP: &str = "delete-old-files-step";
pub const DELETE_OLD_RECORDS_JOB: &str = "delete-old-records";
pub const DELETE_OLD_RECORDS_STEP: &str = "delete-old-records-step";

/// Overrides the configured cleanup directory.
pub const CLEANUP_PATH_PARAM: &str = "cleanup.path";
/// Overrides the configured retention period (days, >= 0).
pub const CLEANUP_MAX_AGE_PARAM: &str = "cleanup.max_age_days";

/// Records older than this are targeted by `delete-old-records`.
pub const RECORD_RETENTION_DAYS: u32 = 7;

/// Resolve the retention policy of a launch: parameters first, then `defaults`.
pub fn retention_policy(defaults: &JobsConfig, params: &JobParameters) -> BatchResult<RetentionPolicy> {
    let root = params
        .get_string(CLEANUP_PATH_PARAM)?
        .map(PathBuf::from)
        .unwrap_or_else(|| defaults.cleanup_dir.clone());

    let max_age_days = match params.get_long(CLEANUP_MAX_AGE_PARAM)? {
        Some(days) => u32::try_from(days).map_err(|_| {
            BatchError::validation(format!(
                "{CLEANUP_MAX_AGE_PARAM} must be between 0 and {}, got {days}",
                u32::MAX
            ))
        })?,
        None => defaults.cleanup_max_age_days,
    };

    Ok(RetentionPolicy::new(root, max_age_days))
}

/// Rejects a negative or non-numeric retention period before the job starts.
pub fn validate_cleanup_parameters(params: &JobParameters) -> BatchResult<()> {
    retention_policy(&JobsConfig::default(), params).map(|_| ())
}

/// Sweeps one directory and logs every deleted or failed entry.
#[derive(Debug, Clone)]
pub struct DeleteOldFilesTasklet {
    sweeper: RetentionSweeper,
}

impl DeleteOldFilesTasklet {
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            sweeper: RetentionSweeper::new(policy),
        }
    }

    pub fn policy(&self) -> &RetentionPolicy {
        self.sweeper.policy()
    }
}

impl Tasklet for DeleteOldFilesTasklet {
    fn execute(&self, ctx: &mut StepContext<'_>) -> BatchResult<RepeatStatus> {
        let policy = self.sweeper.policy();
        info!(
            root = %policy.root_path().display(),
            max_age_days = policy.max_age_days(),
            "sweeping old files"
        );

        let result = self.sweeper.sweep();

        for name in &result.deleted {
            info!(file = %name, "file deleted");
        }
        for name in &result.failed {
            warn!(file = %name, "file deletion failed");
        }
        if result.has_failures() {
            warn!(
                root = %policy.root_path().display(),
                failed = result.failed.len(),
                "sweep finished with failures"
            );
        }

        let deleted = result.deleted.len() as u64;
        let failed = result.failed.len() as u64;
        ctx.contribution.increment_read_count(deleted + failed);
        ctx.contribution.increment_write_count(deleted);
        ctx.contribution.increment_skip_count(failed);
        ctx.put("root_path", json!(policy.root_path().display().to_string()));
        ctx.put("max_age_days", json!(policy.max_age_days()));
        ctx.put("deleted", json!(result.deleted));
        ctx.put("failed", json!(result.failed));

        Ok(RepeatStatus::Finished)
    }
}

/// `delete-old-files`: one retention sweep per launch.
pub fn delete_old_files_job(config: &JobsConfig) -> BatchResult<Job> {
    let defaults = config.clone();
    let step = StepBuilder::new(DELETE_OLD_FILES_STEP)
        .step_scoped(move |params: &JobParameters| {
            Ok(DeleteOldFilesTasklet::new(retention_policy(&defaults, params)?))
        })
        .build()?;

    JobBuilder::new(DELETE_OLD_FILES_JOB)
        .validator(validate_cleanup_parameters)
        .start(step)
        .build()
}

/// `delete-old-records`: placeholder until a record store is wired in; it only logs.
pub fn delete_old_records_job() -> BatchResult<Job> {
    let step = StepBuilder::new(DELETE_OLD_RECORDS_STEP)
        .tasklet(|ctx: &mut StepContext<'_>| -> BatchResult<RepeatStatus> {
            info!(retention_days = RECORD_RETENTION_DAYS, "old records deleted");
            ctx.put("retention_days", json!(RECORD_RETENTION_DAYS));
            Ok(RepeatStatus::Finished)
        })
        .build()?;

    JobBuilder::new(DELETE_OLD_RECORDS_JOB).start(step).build()
}
