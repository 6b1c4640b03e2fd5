//! Tasklets: single units of work invoked by a step.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use sysbatch_core::BatchResult;

use crate::parameters::JobParameters;

/// What a tasklet wants the step to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatStatus {
    /// Invoke the tasklet again.
    Continuable,
    /// The step is done.
    Finished,
}

impl RepeatStatus {
    pub fn continue_if(more: bool) -> Self {
        if more { Self::Continuable } else { Self::Finished }
    }
}

/// Counters a tasklet reports back to its step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepContribution {
    pub read_count: u64,
    pub write_count: u64,
    pub skip_count: u64,
    /// Number of tasklet invocations.
    pub iterations: u64,
}

impl StepContribution {
    pub fn increment_read_count(&mut self, by: u64) {
        self.read_count += by;
    }

    pub fn increment_write_count(&mut self, by: u64) {
        self.write_count += by;
    }

    pub fn increment_skip_count(&mut self, by: u64) {
        self.skip_count += by;
    }
}

/// Everything a tasklet can see and touch while it runs.
#[derive(Debug)]
pub struct StepContext<'a> {
    job_name: &'a str,
    step_name: &'a str,
    parameters: &'a JobParameters,
    pub contribution: StepContribution,
    /// Free-form outcome data, copied into the step execution.
    pub execution_context: Map<String, JsonValue>,
}

impl<'a> StepContext<'a> {
    pub fn new(job_name: &'a str, step_name: &'a str, parameters: &'a JobParameters) -> Self {
        Self {
            job_name,
            step_name,
            parameters,
            contribution: StepContribution::default(),
            execution_context: Map::new(),
        }
    }

    pub fn job_name(&self) -> &str {
        self.job_name
    }

    pub fn step_name(&self) -> &str {
        self.step_name
    }

    pub fn parameters(&self) -> &JobParameters {
        self.parameters
    }

    pub fn put(&mut self, key: impl Into<String>, value: JsonValue) {
        self.execution_context.insert(key.into(), value);
    }
}

/// A single unit of batch work.
pub trait Tasklet: Send + Sync {
    fn execute(&self, context: &mut StepContext<'_>) -> BatchResult<RepeatStatus>;
}

impl<F> Tasklet for F
where
    F: Fn(&mut StepContext<'_>) -> BatchResult<RepeatStatus> + Send + Sync,
{
    fn execute(&self, context: &mut StepContext<'_>) -> BatchResult<RepeatStatus> {
        self(context)
    }
}
