//! Steps: a named tasklet plus how to obtain it.

use std::sync::Arc;

use sysbatch_core::{BatchError, BatchResult};

use crate::parameters::JobParameters;
use crate::tasklet::Tasklet;

/// Builds a tasklet from the parameters of the launch it belongs to.
pub type TaskletFactory = Box<dyn Fn(&JobParameters) -> BatchResult<Box<dyn Tasklet>> + Send + Sync>;

/// Where a step gets its tasklet from.
pub enum TaskletSource {
    /// One tasklet shared by every launch.
    Shared(Arc<dyn Tasklet>),
    /// A fresh tasklet per launch, bound to that launch's parameters.
    StepScoped(TaskletFactory),
}

impl std::fmt::Debug for TaskletSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskletSource::Shared(_) => f.write_str("Shared"),
            TaskletSource::StepScoped(_) => f.write_str("StepScoped"),
        }
    }
}

/// A named unit of a job.
#[derive(Debug)]
pub struct Step {
    name: String,
    source: TaskletSource,
}

impl Step {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_step_scoped(&self) -> bool {
        matches!(self.source, TaskletSource::StepScoped(_))
    }

    /// Resolve the tasklet this step runs for a launch with `parameters`.
    pub fn bind(&self, parameters: &JobParameters) -> BatchResult<BoundStep<'_>> {
        let tasklet = match &self.source {
            TaskletSource::Shared(tasklet) => BoundTasklet::Shared(tasklet.as_ref()),
            TaskletSource::StepScoped(factory) => BoundTasklet::Owned(factory(parameters)?),
        };
        Ok(BoundStep {
            name: &self.name,
            tasklet,
        })
    }
}

enum BoundTasklet<'a> {
    Shared(&'a dyn Tasklet),
    Owned(Box<dyn Tasklet>),
}

/// A step whose tasklet has been resolved for one launch.
pub struct BoundStep<'a> {
    name: &'a str,
    tasklet: BoundTasklet<'a>,
}

impl<'a> BoundStep<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn tasklet(&self) -> &dyn Tasklet {
        match &self.tasklet {
            BoundTasklet::Shared(t) => *t,
            BoundTasklet::Owned(t) => t.as_ref(),
        }
    }
}

/// Fluent builder for [`Step`].
pub struct StepBuilder {
    name: String,
    source: Option<TaskletSource>,
}

impl StepBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
        }
    }

    /// Run the same tasklet on every launch.
    pub fn tasklet(mut self, tasklet: impl Tasklet + 'static) -> Self {
        self.source = Some(TaskletSource::Shared(Arc::new(tasklet)));
        self
    }

    /// Build the tasklet per launch from the job parameters.
    pub fn step_scoped<F, T>(mut self, factory: F) -> Self
    where
        F: Fn(&JobParameters) -> BatchResult<T> + Send + Sync + 'static,
        T: Tasklet + 'static,
    {
        self.source = Some(TaskletSource::StepScoped(Box::new(move |params| {
            Ok(Box::new(factory(params)?) as Box<dyn Tasklet>)
        })));
        self
    }

    pub fn build(self) -> BatchResult<Step> {
        if self.name.trim().is_empty() {
            return Err(BatchError::configuration("step name cannot be empty"));
        }
        let source = self.source.ok_or_else(|| {
            BatchError::configuration(format!("step `{}` has no tasklet", self.name))
        })?;
        Ok(Step {
            name: self.name,
            source,
        })
    }
}
