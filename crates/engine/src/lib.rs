//! Minimal in-process batch engine.
//!
//! ## Design
//!
//! - A `Job` is an ordered list of `Step`s, optionally guarded by a validator
//! - A `Step` runs one `Tasklet` until it reports `Finished`
//! - Tasklets are either shared or step-scoped (built from the launch parameters)
//! - `JobLauncher` runs one job at a time, synchronously, and returns a `JobExecution`
//!
//! There is no persistence, no restart and no retry: every launch starts from
//! scratch and its execution record belongs to the caller.

pub mod execution;
pub mod job;
pub mod launcher;
pub mod parameters;
pub mod step;
pub mod tasklet;
pub mod validator;

pub use execution::{BatchStatus, JobExecution, StepExecution};
pub use job::{Job, JobBuilder};
pub use launcher::{JobLauncher, JobRegistry, run_job};
pub use parameters::{FromParameter, JobParameter, JobParameters, JobParametersBuilder, ParameterValue};
pub use step::{Step, StepBuilder};
pub use tasklet::{RepeatStatus, StepContext, StepContribution, Tasklet};
pub use validator::{
    CompositeJobParametersValidator, DefaultJobParametersValidator, JobParametersValidator,
};
