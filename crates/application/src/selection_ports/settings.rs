use async_trait::async_trait;
use chrono::{DateTime, Utc};
use selecta_core::AppResult;
use selecta_domain::{ProcessGateState, ScoreWeights, UserId};

/// Singleton site settings: the process gate and the score weights.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Loads the canonical gate state; closed when never written.
    async fn process_gate(&self) -> AppResult<ProcessGateState>;

    /// Overwrites the gate state (last writer wins).
    async fn save_process_gate(&self, state: ProcessGateState) -> AppResult<()>;

    /// Loads the score weights; the default split when never written.
    async fn score_weights(&self) -> AppResult<ScoreWeights>;

    /// Overwrites the score weights.
    async fn save_score_weights(
        &self,
        weights: ScoreWeights,
        updated_by: UserId,
        updated_at: DateTime<Utc>,
    ) -> AppResult<()>;
}
