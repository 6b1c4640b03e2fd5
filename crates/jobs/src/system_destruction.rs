//! `system-destruction`: a parameter-validation showcase.
//!
//! The job refuses to start unless a destruction level is given and it does
//! not exceed [`MAX_DESTRUCTION_LEVEL`]. The tasklet itself only logs.

use serde_json::json;
use thiserror::Error;
use tracing::info;

use sysbatch_core::{BatchError, BatchResult};
use sysbatch_engine::{
    CompositeJobParametersValidator, DefaultJobParametersValidator, Job, JobBuilder,
    JobParameters, JobParametersValidator, RepeatStatus, StepBuilder, StepContext, Tasklet,
};

pub const SYSTEM_DESTRUCTION_JOB: &str = "system-destruction";
pub const SYSTEM_DESTRUCTION_STEP: &str = "system-destruction-step";

pub const DESTRUCTION_LEVEL_PARAM: &str = "system.destruction.level";
pub const TARGET_SYSTEM_PARAM: &str = "system.target";

/// Highest destruction level a launch may ask for.
pub const MAX_DESTRUCTION_LEVEL: i64 = 9;

/// Why a destruction level was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DestructionLevelRejection {
    #[error("system.destruction.level is required")]
    Missing,
    #[error("system.destruction.level is not a number: {0}")]
    NotANumber(String),
    #[error("destruction level {level} exceeds the allowed maximum of {max}")]
    ExceedsMaximum { level: i64, max: i64 },
}

/// Read and bound-check the destruction level of a launch.
pub fn check_destruction_level(params: &JobParameters) -> Result<i64, DestructionLevelRejection> {
    let level = params
        .get_long(DESTRUCTION_LEVEL_PARAM)
        .map_err(|e| DestructionLevelRejection::NotANumber(e.to_string()))?
        .ok_or(DestructionLevelRejection::Missing)?;

    if level > MAX_DESTRUCTION_LEVEL {
        return Err(DestructionLevelRejection::ExceedsMaximum {
            level,
            max: MAX_DESTRUCTION_LEVEL,
        });
    }
    Ok(level)
}

/// Validator seam around [`check_destruction_level`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDestructionValidator;

impl JobParametersValidator for SystemDestructionValidator {
    fn validate(&self, parameters: &JobParameters) -> BatchResult<()> {
        check_destruction_level(parameters)
            .map(|_| ())
            .map_err(|rejection| BatchError::validation(rejection.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDestructionTasklet;

impl Tasklet for SystemDestructionTasklet {
    fn execute(&self, ctx: &mut StepContext<'_>) -> BatchResult<RepeatStatus> {
        let target = ctx.parameters().get_string(TARGET_SYSTEM_PARAM)?;
        let level = ctx.parameters().require::<i64>(DESTRUCTION_LEVEL_PARAM)?;

        info!(target_system = target.as_deref().unwrap_or("<none>"), "target system acquired");
        info!(destruction_level = level, "destruction level set");

        ctx.put("target_system", json!(target));
        ctx.put("destruction_level", json!(level));
        Ok(RepeatStatus::Finished)
    }
}

pub fn system_destruction_job() -> BatchResult<Job> {
    let presence =
        DefaultJobParametersValidator::new([DESTRUCTION_LEVEL_PARAM], [TARGET_SYSTEM_PARAM])?;
    let validator = CompositeJobParametersValidator::new()
        .with(presence)
        .with(SystemDestructionValidator);

    JobBuilder::new(SYSTEM_DESTRUCTION_JOB)
        .validator(validator)
        .start(
            StepBuilder::new(SYSTEM_DESTRUCTION_STEP)
                .tasklet(SystemDestructionTasklet)
                .build()?,
        )
        .build()
}
