//! Job and step execution records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use sysbatch_core::{JobExecutionId, StepExecutionId};

use crate::parameters::JobParameters;
use crate::tasklet::StepContribution;

/// Execution status of a job or step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Created, not yet running
    Starting,
    /// Currently being executed
    Started,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
}

impl BatchStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchStatus::Completed | BatchStatus::Failed)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BatchStatus::Completed)
    }
}

/// Record of one step run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepExecution {
    pub id: StepExecutionId,
    pub step_name: String,
    pub status: BatchStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub contribution: StepContribution,
    pub execution_context: Map<String, JsonValue>,
    pub failure: Option<String>,
}

impl StepExecution {
    /// Create a step execution that has just started.
    pub fn start(step_name: impl Into<String>) -> Self {
        Self {
            id: StepExecutionId::new(),
            step_name: step_name.into(),
            status: BatchStatus::Started,
            started_at: Utc::now(),
            finished_at: None,
            contribution: StepContribution::default(),
            execution_context: Map::new(),
            failure: None,
        }
    }

    pub fn mark_completed(&mut self) {
        self.status = BatchStatus::Completed;
        self.finished_at = Some(Utc::now());
    }

    pub fn mark_failed(&mut self, error: String) {
        self.status = BatchStatus::Failed;
        self.finished_at = Some(Utc::now());
        self.failure = Some(error);
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds().max(0) as u64)
    }
}

/// Record of one job launch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobExecution {
    pub id: JobExecutionId,
    pub job_name: String,
    pub parameters: JobParameters,
    pub status: BatchStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub step_executions: Vec<StepExecution>,
    pub failure: Option<String>,
}

impl JobExecution {
    pub fn new(job_name: impl Into<String>, parameters: JobParameters) -> Self {
        Self {
            id: JobExecutionId::new(),
            job_name: job_name.into(),
            parameters,
            status: BatchStatus::Starting,
            created_at: Utc::now(),
            started_at: None,
            ended_at: None,
            step_executions: Vec::new(),
            failure: None,
        }
    }

    pub fn mark_started(&mut self) {
        self.status = BatchStatus::Started;
        self.started_at = Some(Utc::now());
    }

    pub fn mark_completed(&mut self) {
        self.status = BatchStatus::Completed;
        self.ended_at = Some(Utc::now());
    }

    pub fn mark_failed(&mut self, error: String) {
        self.status = BatchStatus::Failed;
        self.ended_at = Some(Utc::now());
        self.failure = Some(error);
    }

    pub fn step(&self, name: &str) -> Option<&StepExecution> {
        self.step_executions.iter().find(|s| s.step_name == name)
    }

    pub fn duration_ms(&self) -> Option<u64> {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds().max(0) as u64),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_execution_lifecycle() {
        let mut execution = JobExecution::new("job", JobParameters::new());
        assert_eq!(execution.status, BatchStatus::Starting);
        assert!(execution.duration_ms().is_none());

        execution.mark_started();
        assert_eq!(execution.status, BatchStatus::Started);
        assert!(!execution.status.is_terminal());

        execution.mark_completed();
        assert!(execution.status.is_terminal());
        assert!(execution.status.is_success());
        assert!(execution.duration_ms().is_some());
    }

    #[test]
    fn step_failure_records_error() {
        let mut step = StepExecution::start("step");
        step.mark_failed("disk on fire".to_string());

        assert_eq!(step.status, BatchStatus::Failed);
        assert_eq!(step.failure.as_deref(), Some("disk on fire"));
        assert!(step.finished_at.is_some());
    }

    #[test]
    fn execution_serializes_with_snake_case_status() {
        let mut execution = JobExecution::new("job", JobParameters::new());
        execution.mark_started();
        execution.mark_failed("boom".to_string());

        let json = serde_json::to_value(&execution).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["failure"], "boom");
    }
}
