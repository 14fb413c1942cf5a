use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use selecta_application::SettingsRepository;
use selecta_core::{AppError, AppResult};
use selecta_domain::{ProcessGateState, ScoreWeights, UserId};

use crate::postgres_error::store_error;

/// PostgreSQL-backed `site_settings` singleton.
#[derive(Clone)]
pub struct PostgresSettingsRepository {
    pool: PgPool,
}

impl PostgresSettingsRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct GateRow {
    selection_process_open: bool,
    selection_process_updated_by: Option<uuid::Uuid>,
    selection_process_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
struct WeightsRow {
    test_weight: i16,
    interview_weight: i16,
}

#[async_trait]
impl SettingsRepository for PostgresSettingsRepository {
    async fn process_gate(&self) -> AppResult<ProcessGateState> {
        let row = sqlx::query_as::<_, GateRow>(
            r#"
            SELECT
                selection_process_open,
                selection_process_updated_by,
                selection_process_updated_at
            FROM site_settings
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| store_error("failed to load process gate", error))?;

        Ok(row
            .map(|row| ProcessGateState {
                is_open: row.selection_process_open,
                updated_by: row.selection_process_updated_by.map(UserId::from_uuid),
                updated_at: row.selection_process_updated_at,
            })
            .unwrap_or_default())
    }

    async fn save_process_gate(&self, state: ProcessGateState) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO site_settings (
                id,
                selection_process_open,
                selection_process_updated_by,
                selection_process_updated_at
            )
            VALUES (1, $1, $2, $3)
            ON CONFLICT (id) DO UPDATE
            SET selection_process_open = EXCLUDED.selection_process_open,
                selection_process_updated_by = EXCLUDED.selection_process_updated_by,
                selection_process_updated_at = EXCLUDED.selection_process_updated_at
            "#,
        )
        .bind(state.is_open)
        .bind(state.updated_by.map(|user_id| user_id.as_uuid()))
        .bind(state.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| store_error("failed to save process gate", error))?;

        Ok(())
    }

    async fn score_weights(&self) -> AppResult<ScoreWeights> {
        let row = sqlx::query_as::<_, WeightsRow>(
            "SELECT test_weight, interview_weight FROM site_settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| store_error("failed to load score weights", error))?;

        match row {
            Some(row) => ScoreWeights::new(
                i32::from(row.test_weight),
                i32::from(row.interview_weight),
            )
            .map_err(|error| AppError::Internal(format!("stored score weights are invalid: {error}"))),
            None => Ok(ScoreWeights::default()),
        }
    }

    async fn save_score_weights(
        &self,
        weights: ScoreWeights,
        updated_by: UserId,
        updated_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO site_settings (
                id,
                test_weight,
                interview_weight,
                weights_updated_by,
                weights_updated_at
            )
            VALUES (1, $1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET test_weight = EXCLUDED.test_weight,
                interview_weight = EXCLUDED.interview_weight,
                weights_updated_by = EXCLUDED.weights_updated_by,
                weights_updated_at = EXCLUDED.weights_updated_at
            "#,
        )
        .bind(i16::from(weights.test_weight()))
        .bind(i16::from(weights.interview_weight()))
        .bind(updated_by.as_uuid())
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| store_error("failed to save score weights", error))?;

        Ok(())
    }
}
