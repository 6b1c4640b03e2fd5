//! Job registry and synchronous launcher.

use std::collections::BTreeMap;

use tracing::{debug, error, info, warn};

use sysbatch_core::{BatchError, BatchResult};

use crate::execution::{JobExecution, StepExecution};
use crate::job::Job;
use crate::parameters::JobParameters;
use crate::step::BoundStep;
use crate::tasklet::{RepeatStatus, StepContext};

/// Jobs known to a launcher, by name.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: BTreeMap<String, Job>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job. Names are unique.
    pub fn register(&mut self, job: Job) -> BatchResult<()> {
        if self.jobs.contains_key(job.name()) {
            return Err(BatchError::conflict(format!(
                "job `{}` is already registered",
                job.name()
            )));
        }
        self.jobs.insert(job.name().to_string(), job);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Job> {
        self.jobs.get(name)
    }

    /// Registered job names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.jobs.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Runs registered jobs to completion on the calling thread.
///
/// A launch goes through three phases:
/// 1. validation of the parameters,
/// 2. binding of every step-scoped tasklet,
/// 3. running the steps in order.
///
/// Failures in phases 1 and 2 are returned as `Err` and nothing has run.
/// A failing tasklet in phase 3 stops the job and is reported through the
/// returned execution's status.
#[derive(Debug)]
pub struct JobLauncher {
    registry: JobRegistry,
}

impl JobLauncher {
    pub fn new(registry: JobRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    /// Launch the job registered under `job_name`.
    pub fn run(&self, job_name: &str, parameters: JobParameters) -> BatchResult<JobExecution> {
        let job = self
            .registry
            .get(job_name)
            .ok_or_else(|| BatchError::unknown_job(job_name))?;
        run_job(job, parameters)
    }
}

/// Launch a job directly, without a registry.
pub fn run_job(job: &Job, parameters: JobParameters) -> BatchResult<JobExecution> {
    if let Err(e) = job.validate(&parameters) {
        warn!(job = %job.name(), error = %e, "job parameters rejected");
        return Err(e);
    }

    let bound: Vec<BoundStep<'_>> = job
        .steps()
        .iter()
        .map(|step| step.bind(&parameters))
        .collect::<BatchResult<_>>()
        .inspect_err(|e| warn!(job = %job.name(), error = %e, "failed to bind step tasklets"))?;

    let mut execution = JobExecution::new(job.name(), parameters.clone());
    execution.mark_started();
    info!(
        job = %job.name(),
        execution_id = %execution.id,
        parameters = parameters.len(),
        "job started"
    );

    for step in &bound {
        let step_execution = execute_step(job.name(), step, &parameters);
        let failure = step_execution.failure.clone();
        execution.step_executions.push(step_execution);

        if let Some(error) = failure {
            error!(
                job = %job.name(),
                execution_id = %execution.id,
                step = %step.name(),
                error = %error,
                "job failed"
            );
            execution.mark_failed(format!("step `{}` failed: {error}", step.name()));
            return Ok(execution);
        }
    }

    execution.mark_completed();
    info!(
        job = %job.name(),
        execution_id = %execution.id,
        duration_ms = execution.duration_ms().unwrap_or_default(),
        "job completed"
    );
    Ok(execution)
}

fn execute_step(job_name: &str, step: &BoundStep<'_>, parameters: &JobParameters) -> StepExecution {
    let mut step_execution = StepExecution::start(step.name());
    let mut context = StepContext::new(job_name, step.name(), parameters);
    debug!(job = %job_name, step = %step.name(), "step started");

    let outcome = loop {
        context.contribution.iterations += 1;
        match step.tasklet().execute(&mut context) {
            Ok(RepeatStatus::Continuable) => continue,
            Ok(RepeatStatus::Finished) => break Ok(()),
            Err(e) => break Err(e),
        }
    };

    step_execution.contribution = context.contribution;
    step_execution.execution_context = context.execution_context;

    match outcome {
        Ok(()) => {
            step_execution.mark_completed();
            debug!(
                job = %job_name,
                step = %step.name(),
                iterations = step_execution.contribution.iterations,
                "step completed"
            );
        }
        Err(e) => step_execution.mark_failed(e.to_string()),
    }

    step_execution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::BatchStatus;
    use crate::job::JobBuilder;
    use crate::step::StepBuilder;
    use crate::validator::DefaultJobParametersValidator;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counting_step(name: &str, counter: Arc<AtomicU32>) -> crate::step::Step {
        StepBuilder::new(name)
            .tasklet(move |_: &mut StepContext<'_>| -> BatchResult<RepeatStatus> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(RepeatStatus::Finished)
            })
            .build()
            .unwrap()
    }

    fn failing_step(name: &str) -> crate::step::Step {
        StepBuilder::new(name)
            .tasklet(|_: &mut StepContext<'_>| -> BatchResult<RepeatStatus> {
                Err(BatchError::collaborator("notification channel down"))
            })
            .build()
            .unwrap()
    }

    #[test]
    fn runs_steps_in_order_and_completes() {
        let counter = Arc::new(AtomicU32::new(0));
        let job = JobBuilder::new("job")
            .start(counting_step("a", counter.clone()))
            .next(counting_step("b", counter.clone()))
            .build()
            .unwrap();

        let execution = run_job(&job, JobParameters::new()).unwrap();

        assert_eq!(execution.status, BatchStatus::Completed);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        let names: Vec<_> = execution.step_executions.iter().map(|s| s.step_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn failing_step_stops_remaining_steps() {
        let counter = Arc::new(AtomicU32::new(0));
        let job = JobBuilder::new("job")
            .start(failing_step("a"))
            .next(counting_step("b", counter.clone()))
            .build()
            .unwrap();

        let execution = run_job(&job, JobParameters::new()).unwrap();

        assert_eq!(execution.status, BatchStatus::Failed);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(execution.step_executions.len(), 1);
        assert_eq!(execution.step("a").unwrap().status, BatchStatus::Failed);
        assert!(execution.failure.unwrap().contains("notification channel down"));
    }

    #[test]
    fn rejected_parameters_run_nothing() {
        let counter = Arc::new(AtomicU32::new(0));
        let job = JobBuilder::new("job")
            .validator(DefaultJobParametersValidator::new(["required"], Vec::<String>::new()).unwrap())
            .start(counting_step("a", counter.clone()))
            .build()
            .unwrap();

        let err = run_job(&job, JobParameters::new()).unwrap_err();

        assert!(matches!(err, BatchError::Validation(_)));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn binding_failure_in_later_step_runs_nothing() {
        let counter = Arc::new(AtomicU32::new(0));
        let job = JobBuilder::new("job")
            .start(counting_step("a", counter.clone()))
            .next(
                StepBuilder::new("b")
                    .step_scoped(|params: &JobParameters| {
                        let level = params.require::<i64>("level")?;
                        Ok(move |_: &mut StepContext<'_>| -> BatchResult<RepeatStatus> {
                            let _ = level;
                            Ok(RepeatStatus::Finished)
                        })
                    })
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();

        let err = run_job(&job, JobParameters::new()).unwrap_err();

        assert_eq!(err, BatchError::MissingParameter("level".to_string()));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn continuable_tasklet_is_invoked_until_finished() {
        let remaining = Arc::new(AtomicU32::new(3));
        let r = remaining.clone();
        let job = JobBuilder::new("job")
            .start(
                StepBuilder::new("drain")
                    .tasklet(move |ctx: &mut StepContext<'_>| -> BatchResult<RepeatStatus> {
                        ctx.contribution.increment_write_count(1);
                        let left = r.fetch_sub(1, Ordering::SeqCst) - 1;
                        Ok(RepeatStatus::continue_if(left > 0))
                    })
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();

        let execution = run_job(&job, JobParameters::new()).unwrap();
        let step = execution.step("drain").unwrap();

        assert_eq!(step.contribution.iterations, 3);
        assert_eq!(step.contribution.write_count, 3);
        assert_eq!(remaining.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn registry_rejects_duplicates_and_unknown_jobs() {
        let counter = Arc::new(AtomicU32::new(0));
        let mut registry = JobRegistry::new();
        registry
            .register(JobBuilder::new("job").start(counting_step("a", counter.clone())).build().unwrap())
            .unwrap();

        let err = registry
            .register(JobBuilder::new("job").start(counting_step("a", counter)).build().unwrap())
            .unwrap_err();
        assert!(matches!(err, BatchError::Conflict(_)));

        let launcher = JobLauncher::new(registry);
        assert_eq!(launcher.registry().names(), vec!["job"]);
        let err = launcher.run("nope", JobParameters::new()).unwrap_err();
        assert_eq!(err, BatchError::UnknownJob("nope".to_string()));
    }
}
