use std::sync::Arc;
use std::time::Duration;

use selecta_core::AppResult;
use selecta_domain::{Actor, AuditAction, Score, ScoreWeights, compute_final_score};
use tracing::info;

use crate::AuthorizationService;
use crate::best_effort::record_audit_event;
use crate::clock::Clock;
use crate::selection_ports::{AuditEvent, AuditRepository, SettingsRepository};
use crate::store_timeout::bounded;

/// Weighted scoring over the stored weight split.
#[derive(Clone)]
pub struct ScoringService {
    authorization_service: AuthorizationService,
    settings_repository: Arc<dyn SettingsRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
}

impl ScoringService {
    /// Creates a new scoring service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        settings_repository: Arc<dyn SettingsRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        clock: Arc<dyn Clock>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            authorization_service,
            settings_repository,
            audit_repository,
            clock,
            store_timeout,
        }
    }

    /// Replaces the weight split used for final scores.
    pub async fn set_weights(
        &self,
        actor: &Actor,
        test_weight: i32,
        interview_weight: i32,
    ) -> AppResult<ScoreWeights> {
        self.authorization_service.require_process_manager(actor)?;
        let weights = ScoreWeights::new(test_weight, interview_weight)?;

        bounded(
            self.store_timeout,
            "save score weights",
            self.settings_repository
                .save_score_weights(weights, actor.id(), self.clock.now()),
        )
        .await?;

        record_audit_event(
            self.audit_repository.as_ref(),
            self.store_timeout,
            AuditEvent {
                subject: actor.id().to_string(),
                action: AuditAction::ScoreWeightsUpdated,
                resource_type: "site_settings".to_owned(),
                resource_id: "score_weights".to_owned(),
                detail: Some(format!(
                    "test={} interview={}",
                    weights.test_weight(),
                    weights.interview_weight()
                )),
            },
        )
        .await;

        info!(
            actor = %actor.id(),
            test_weight = weights.test_weight(),
            interview_weight = weights.interview_weight(),
            "score weights updated"
        );

        Ok(weights)
    }

    /// Returns the stored weights, or the default split when never set.
    pub async fn current_weights(&self) -> AppResult<ScoreWeights> {
        bounded(
            self.store_timeout,
            "load score weights",
            self.settings_repository.score_weights(),
        )
        .await
    }

    /// Computes a final score with the stored weights.
    ///
    /// Every supplied score must lie in `[0, 100]`.
    pub async fn compute_final_score(
        &self,
        test_score: Option<f64>,
        interview_scores: &[f64],
    ) -> AppResult<Option<f64>> {
        let test_score = test_score.map(Score::new).transpose()?;
        let interview_scores = interview_scores
            .iter()
            .map(|score| Score::new(*score).map(|score| score.value()))
            .collect::<AppResult<Vec<_>>>()?;
        let weights = self.current_weights().await?;

        Ok(compute_final_score(
            test_score.map(|score| score.value()),
            &interview_scores,
            weights,
        ))
    }
}
