use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::json;
use tracing::info;

use sysbatch_core::BatchResult;
use sysbatch_engine::{JobParameters, RepeatStatus, StepContext, Tasklet};

pub const EXECUTION_DATE_PARAM: &str = "executionDate";
pub const START_TIME_PARAM: &str = "startTime";

/// Hours the operation takes; one progress tick is logged per hour.
pub const OPERATION_HOURS: u32 = 3;

/// Hourly progress timestamps after `start`, `hours` of them.
pub fn progress_timeline(start: NaiveDateTime, hours: u32) -> Vec<NaiveDateTime> {
    (1..=hours)
        .map(|h| start + Duration::hours(i64::from(h)))
        .collect()
}

/// Logs a scheduled operation and its hourly progress.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionScheduleTasklet {
    execution_date: NaiveDate,
    start_time: NaiveDateTime,
}

impl ExecutionScheduleTasklet {
    pub fn new(execution_date: NaiveDate, start_time: NaiveDateTime) -> Self {
        Self {
            execution_date,
            start_time,
        }
    }

    pub fn from_parameters(params: &JobParameters) -> BatchResult<Self> {
        Ok(Self::new(
            params.require(EXECUTION_DATE_PARAM)?,
            params.require(START_TIME_PARAM)?,
        ))
    }
}

impl Tasklet for ExecutionScheduleTasklet {
    fn execute(&self, ctx: &mut StepContext<'_>) -> BatchResult<RepeatStatus> {
        info!(
            execution_date = %self.execution_date.format("%Y-%m-%d"),
            start_time = %self.start_time.format("%Y-%m-%d %H:%M:%S"),
            "system cleanup operation scheduled"
        );

        let timeline = progress_timeline(self.start_time, OPERATION_HOURS);
        for (hour, at) in timeline.iter().enumerate() {
            info!(elapsed_hours = hour + 1, now = %at.format("%H:%M"), "cleanup in progress");
        }

        let ended_at = timeline.last().copied().unwrap_or(self.start_time);
        info!(ended_at = %ended_at.format("%Y-%m-%d %H:%M:%S"), "all target systems removed");

        ctx.put("execution_date", json!(self.execution_date));
        ctx.put("started_at", json!(self.start_time));
        ctx.put("ended_at", json!(ended_at));
        Ok(RepeatStatus::Finished)
    }
}
