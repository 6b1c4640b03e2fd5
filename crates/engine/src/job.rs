//! Jobs: an ordered list of steps guarded by an optional parameter validator.

use sysbatch_core::{BatchError, BatchResult};

use crate::parameters::JobParameters;
use crate::step::Step;
use crate::validator::JobParametersValidator;

/// A named batch job.
pub struct Job {
    name: String,
    validator: Option<Box<dyn JobParametersValidator>>,
    steps: Vec<Step>,
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("name", &self.name)
            .field("has_validator", &self.validator.is_some())
            .field("steps", &self.steps)
            .finish()
    }
}

impl Job {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(Step::name).collect()
    }

    /// Run the job's validator, if any.
    pub fn validate(&self, parameters: &JobParameters) -> BatchResult<()> {
        match &self.validator {
            Some(validator) => validator.validate(parameters),
            None => Ok(()),
        }
    }
}

/// Fluent builder for [`Job`].
pub struct JobBuilder {
    name: String,
    validator: Option<Box<dyn JobParametersValidator>>,
    steps: Vec<Step>,
    starts: usize,
}

impl JobBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            validator: None,
            steps: Vec::new(),
            starts: 0,
        }
    }

    pub fn validator(mut self, validator: impl JobParametersValidator + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// First step of the job. Calling it more than once fails the build.
    pub fn start(mut self, step: Step) -> Self {
        self.steps.insert(0, step);
        self.starts += 1;
        self
    }

    /// Step run after the previously added ones.
    pub fn next(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn build(self) -> BatchResult<Job> {
        if self.name.trim().is_empty() {
            return Err(BatchError::configuration("job name cannot be empty"));
        }
        if self.starts > 1 {
            return Err(BatchError::configuration(format!(
                "job `{}` has more than one start step",
                self.name
            )));
        }
        if self.steps.is_empty() {
            return Err(BatchError::configuration(format!(
                "job `{}` has no steps",
                self.name
            )));
        }
        if let Some(dup) = first_duplicate(self.steps.iter().map(Step::name)) {
            return Err(BatchError::configuration(format!(
                "job `{}` has two steps named `{dup}`",
                self.name
            )));
        }
        Ok(Job {
            name: self.name,
            validator: self.validator,
            steps: self.steps,
        })
    }
}

fn first_duplicate<'a>(names: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = std::collections::HashSet::new();
    names.into_iter().find(|name| !seen.insert(*name))
}
