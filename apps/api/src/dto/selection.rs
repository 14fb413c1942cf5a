use selecta_domain::{ProcessGateState, ScoreWeights};
use serde::{Deserialize, Serialize};

/// Public view of the selection process gate.
#[derive(Debug, Serialize)]
pub struct ProcessStateResponse {
    pub is_open: bool,
    pub updated_by: Option<String>,
    pub updated_at: Option<String>,
}

/// Incoming payload for score weight updates.
#[derive(Debug, Deserialize)]
pub struct ScoreWeightsRequest {
    pub test_weight: i32,
    pub interview_weight: i32,
}

/// API representation of the score weights.
#[derive(Debug, Serialize)]
pub struct ScoreWeightsResponse {
    pub test_weight: u8,
    pub interview_weight: u8,
}

/// Ad-hoc final score computation input.
#[derive(Debug, Deserialize)]
pub struct FinalScoreRequest {
    pub test_score: Option<f64>,
    #[serde(default)]
    pub interview_scores: Vec<f64>,
}

/// Ad-hoc final score computation result.
#[derive(Debug, Serialize)]
pub struct FinalScoreResponse {
    pub final_score: Option<f64>,
    pub weights: ScoreWeightsResponse,
}

impl From<ProcessGateState> for ProcessStateResponse {
    fn from(value: ProcessGateState) -> Self {
        Self {
            is_open: value.is_open,
            updated_by: value.updated_by.map(|id| id.to_string()),
            updated_at: value.updated_at.map(|at| at.to_rfc3339()),
        }
    }
}

impl From<ScoreWeights> for ScoreWeightsResponse {
    fn from(value: ScoreWeights) -> Self {
        Self {
            test_weight: value.test_weight(),
            interview_weight: value.interview_weight(),
        }
    }
}
