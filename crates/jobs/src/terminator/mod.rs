//! Log-only demo jobs showing step-scoped parameter binding.
//!
//! Each job has a single step whose tasklet is built per launch from the job
//! parameters, so a missing or malformed parameter is reported before any
//! step starts.

pub mod infiltration;
pub mod quest;
pub mod schedule;

use sysbatch_core::BatchResult;
use sysbatch_engine::{DefaultJobParametersValidator, Job, JobBuilder, StepBuilder};

pub use infiltration::{
    InfiltrationParameters, InfiltrationTasklet, estimated_infiltration_minutes,
    security_multiplier,
};
pub use quest::{BASE_REWARD_MB, QuestDifficulty, QuestTasklet};
pub use schedule::{ExecutionScheduleTasklet, progress_timeline};

pub const TERMINATOR_JOB: &str = "terminator";
pub const TERMINATOR_STEP: &str = "terminator-step";
pub const TERMINATOR_SCHEDULE_JOB: &str = "terminator-schedule";
pub const TERMINATOR_SCHEDULE_STEP: &str = "terminator-schedule-step";
pub const TERMINATOR_QUEST_JOB: &str = "terminator-quest";
pub const TERMINATOR_QUEST_STEP: &str = "terminator-quest-step";

pub fn terminator_job() -> BatchResult<Job> {
    let step = StepBuilder::new(TERMINATOR_STEP)
        .step_scoped(|params| {
            InfiltrationParameters::from_parameters(params).map(InfiltrationTasklet::new)
        })
        .build()?;

    JobBuilder::new(TERMINATOR_JOB)
        .validator(DefaultJobParametersValidator::new(
            [infiltration::SECURITY_LEVEL_PARAM],
            [
                infiltration::MISSION_NAME_PARAM,
                infiltration::OPERATION_COMMANDER_PARAM,
            ],
        )?)
        .start(step)
        .build()
}

pub fn terminator_schedule_job() -> BatchResult<Job> {
    let step = StepBuilder::new(TERMINATOR_SCHEDULE_STEP)
        .step_scoped(ExecutionScheduleTasklet::from_parameters)
        .build()?;

    JobBuilder::new(TERMINATOR_SCHEDULE_JOB)
        .validator(DefaultJobParametersValidator::new(
            [schedule::EXECUTION_DATE_PARAM, schedule::START_TIME_PARAM],
            Vec::<String>::new(),
        )?)
        .start(step)
        .build()
}

pub fn terminator_quest_job() -> BatchResult<Job> {
    let step = StepBuilder::new(TERMINATOR_QUEST_STEP)
        .step_scoped(QuestTasklet::from_parameters)
        .build()?;

    JobBuilder::new(TERMINATOR_QUEST_JOB)
        .validator(DefaultJobParametersValidator::new(
            [quest::QUEST_DIFFICULTY_PARAM],
            Vec::<String>::new(),
        )?)
        .start(step)
        .build()
}
