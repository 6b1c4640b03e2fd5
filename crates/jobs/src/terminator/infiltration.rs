use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use sysbatch_core::BatchResult;
use sysbatch_engine::{JobParameters, RepeatStatus, StepContext, Tasklet};

pub const MISSION_NAME_PARAM: &str = "missionName";
pub const SECURITY_LEVEL_PARAM: &str = "securityLevel";
pub const OPERATION_COMMANDER_PARAM: &str = "operationCommander";

/// Minutes needed to get through a level-1 system.
pub const BASE_INFILTRATION_MINUTES: u32 = 60;

/// Launch parameters of an infiltration, bound once per launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfiltrationParameters {
    pub mission_name: Option<String>,
    pub security_level: i64,
    pub operation_commander: Option<String>,
}

impl InfiltrationParameters {
    /// `securityLevel` is required; the names are optional.
    pub fn from_parameters(params: &JobParameters) -> BatchResult<Self> {
        Ok(Self {
            mission_name: params.get_string(MISSION_NAME_PARAM)?,
            security_level: params.require::<i64>(SECURITY_LEVEL_PARAM)?,
            operation_commander: params.get_string(OPERATION_COMMANDER_PARAM)?,
        })
    }
}

/// Time multiplier per security level; unknown levels count as level 1.
pub fn security_multiplier(security_level: i64) -> u32 {
    match security_level {
        1 => 1,
        2 => 2,
        3 => 4,
        4 => 8,
        _ => 1,
    }
}

pub fn estimated_infiltration_minutes(security_level: i64) -> u32 {
    BASE_INFILTRATION_MINUTES * security_multiplier(security_level)
}

#[derive(Debug, Clone)]
pub struct InfiltrationTasklet {
    params: InfiltrationParameters,
}

impl InfiltrationTasklet {
    pub fn new(params: InfiltrationParameters) -> Self {
        Self { params }
    }
}

impl Tasklet for InfiltrationTasklet {
    fn execute(&self, ctx: &mut StepContext<'_>) -> BatchResult<RepeatStatus> {
        let p = &self.params;
        let minutes = estimated_infiltration_minutes(p.security_level);

        info!(
            mission = p.mission_name.as_deref().unwrap_or("<unnamed>"),
            security_level = p.security_level,
            commander = p.operation_commander.as_deref().unwrap_or("<unassigned>"),
            "infiltration initialized"
        );
        info!(estimated_minutes = minutes, "infiltration time estimated");

        ctx.put("mission_name", json!(p.mission_name));
        ctx.put("security_level", json!(p.security_level));
        ctx.put("operation_commander", json!(p.operation_commander));
        ctx.put("estimated_minutes", json!(minutes));
        Ok(RepeatStatus::Finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sysbatch_core::BatchError;

    #[test]
    fn multiplier_table() {
        let minutes: Vec<u32> = (0..=5).map(estimated_infiltration_minutes).collect();
        assert_eq!(minutes, vec![60, 60, 120, 240, 480, 60]);
    }

    #[test]
    fn binds_from_string_parameters() {
        let params = JobParameters::parse_args([
            "missionName=ghost-protocol",
            "securityLevel=3",
            "operationCommander=K",
        ])
        .unwrap();

        let bound = InfiltrationParameters::from_parameters(&params).unwrap();
        assert_eq!(
            bound,
            InfiltrationParameters {
                mission_name: Some("ghost-protocol".to_string()),
                security_level: 3,
                operation_commander: Some("K".to_string()),
            }
        );
    }

    #[test]
    fn security_level_is_required() {
        let params = JobParameters::parse_args(["missionName=ghost-protocol"]).unwrap();
        let err = InfiltrationParameters::from_parameters(&params).unwrap_err();
        assert_eq!(err, BatchError::MissingParameter(SECURITY_LEVEL_PARAM.to_string()));
    }
}
