use selecta_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Lower bound of every test and interview score.
pub const SCORE_MIN: f64 = 0.0;

/// Upper bound of every test and interview score.
pub const SCORE_MAX: f64 = 100.0;

/// A test or interview score in `[0, 100]`, kept at full precision.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Score(f64);

impl Score {
    /// Creates a validated score.
    pub fn new(value: f64) -> AppResult<Self> {
        if !value.is_finite() || !(SCORE_MIN..=SCORE_MAX).contains(&value) {
            return Err(AppError::Validation(format!(
                "score {value} must be within [{SCORE_MIN}, {SCORE_MAX}]"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the raw score value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Score {
    type Error = AppError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for f64 {
    fn from(value: Score) -> Self {
        value.0
    }
}

/// Relative weights of the written test and the interview average.
///
/// Both are percentages and always sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreWeights {
    test_weight: u8,
    interview_weight: u8,
}

impl ScoreWeights {
    /// Creates validated weights.
    pub fn new(test_weight: i32, interview_weight: i32) -> AppResult<Self> {
        let in_range = |value: i32| (0..=100).contains(&value);
        if !in_range(test_weight) || !in_range(interview_weight) {
            return Err(AppError::InvalidWeights(format!(
                "weights must be within [0, 100], got test={test_weight} interview={interview_weight}"
            )));
        }

        if test_weight + interview_weight != 100 {
            return Err(AppError::InvalidWeights(format!(
                "weights must sum to 100, got {}",
                test_weight + interview_weight
            )));
        }

        Ok(Self {
            test_weight: u8::try_from(test_weight).map_err(|_| {
                AppError::InvalidWeights(format!("test weight {test_weight} out of range"))
            })?,
            interview_weight: u8::try_from(interview_weight).map_err(|_| {
                AppError::InvalidWeights(format!(
                    "interview weight {interview_weight} out of range"
                ))
            })?,
        })
    }

    /// Returns the test weight percentage.
    #[must_use]
    pub fn test_weight(&self) -> u8 {
        self.test_weight
    }

    /// Returns the interview weight percentage.
    #[must_use]
    pub fn interview_weight(&self) -> u8 {
        self.interview_weight
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            test_weight: 40,
            interview_weight: 60,
        }
    }
}

/// Computes the weighted final score.
///
/// Returns `None` while the test score or every interview score is missing,
/// so a final score is never derived from partial data.
#[must_use]
pub fn compute_final_score(
    test_score: Option<f64>,
    interview_scores: &[f64],
    weights: ScoreWeights,
) -> Option<f64> {
    let test_score = test_score?;
    if interview_scores.is_empty() {
        return None;
    }

    let interview_average = interview_scores.iter().sum::<f64>() / interview_scores.len() as f64;

    Some(
        test_score * f64::from(weights.test_weight) / 100.0
            + interview_average * f64::from(weights.interview_weight) / 100.0,
    )
}
