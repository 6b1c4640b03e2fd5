use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use sysbatch_core::{BatchError, BatchResult};
use sysbatch_engine::{JobParameters, RepeatStatus, StepContext, Tasklet};

pub const QUEST_DIFFICULTY_PARAM: &str = "questDifficulty";

/// Resources granted for an `EASY` quest, in megabytes.
pub const BASE_REWARD_MB: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestDifficulty {
    Easy,
    Normal,
    Hard,
    Extreme,
}

impl QuestDifficulty {
    pub const ALL: [QuestDifficulty; 4] = [
        QuestDifficulty::Easy,
        QuestDifficulty::Normal,
        QuestDifficulty::Hard,
        QuestDifficulty::Extreme,
    ];

    pub fn reward_multiplier(self) -> u32 {
        match self {
            QuestDifficulty::Easy => 1,
            QuestDifficulty::Normal => 2,
            QuestDifficulty::Hard => 3,
            QuestDifficulty::Extreme => 5,
        }
    }

    pub fn reward_mb(self) -> u32 {
        BASE_REWARD_MB * self.reward_multiplier()
    }
}

impl fmt::Display for QuestDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QuestDifficulty::Easy => "EASY",
            QuestDifficulty::Normal => "NORMAL",
            QuestDifficulty::Hard => "HARD",
            QuestDifficulty::Extreme => "EXTREME",
        })
    }
}

impl FromStr for QuestDifficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuestDifficulty::ALL
            .into_iter()
            .find(|d| d.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown quest difficulty `{s}` (expected EASY, NORMAL, HARD or EXTREME)"))
    }
}

/// Logs a quest and the resources it pays out.
#[derive(Debug, Clone, Copy)]
pub struct QuestTasklet {
    difficulty: QuestDifficulty,
}

impl QuestTasklet {
    pub fn new(difficulty: QuestDifficulty) -> Self {
        Self { difficulty }
    }

    pub fn from_parameters(params: &JobParameters) -> BatchResult<Self> {
        let difficulty = params
            .get_parsed::<QuestDifficulty>(QUEST_DIFFICULTY_PARAM)?
            .ok_or_else(|| BatchError::missing(QUEST_DIFFICULTY_PARAM))?;
        Ok(Self::new(difficulty))
    }
}

impl Tasklet for QuestTasklet {
    fn execute(&self, ctx: &mut StepContext<'_>) -> BatchResult<RepeatStatus> {
        let reward = self.difficulty.reward_mb();

        info!(difficulty = %self.difficulty, "infiltration quest started");
        info!("system hack in progress");
        info!(reward_mb = reward, "system captured");

        ctx.put("difficulty", json!(self.difficulty));
        ctx.put("reward_mb", json!(reward));
        Ok(RepeatStatus::Finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multipliers_follow_difficulty() {
        let rewards: Vec<u32> = QuestDifficulty::ALL.iter().map(|d| d.reward_mb()).collect();
        assert_eq!(rewards, vec![100, 200, 300, 500]);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("extreme".parse::<QuestDifficulty>(), Ok(QuestDifficulty::Extreme));
        assert_eq!(" Hard ".parse::<QuestDifficulty>(), Ok(QuestDifficulty::Hard));
        assert!("nightmare".parse::<QuestDifficulty>().is_err());
    }

    #[test]
    fn unknown_difficulty_is_a_parameter_error() {
        let params = JobParameters::parse_args(["questDifficulty=NIGHTMARE"]).unwrap();
        let err = QuestTasklet::from_parameters(&params).unwrap_err();
        assert!(matches!(err, BatchError::ParameterType { .. }));
    }

    #[test]
    fn tasklet_records_reward() {
        let params = JobParameters::parse_args(["questDifficulty=HARD"]).unwrap();
        let tasklet = QuestTasklet::from_parameters(&params).unwrap();
        let mut ctx = StepContext::new("job", "step", &params);

        tasklet.execute(&mut ctx).unwrap();

        assert_eq!(ctx.execution_context["difficulty"], json!("HARD"));
        assert_eq!(ctx.execution_context["reward_mb"], json!(300));
    }
}
