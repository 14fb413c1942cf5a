use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use selecta_application::{RegistrationQuery, RegistrationRepository};
use selecta_core::{AppError, AppResult};
use selecta_domain::{Registration, RegistrationId, RegistrationStatus, Score, UserId};

use crate::postgres_error::store_error;

/// PostgreSQL-backed registration store with version-checked updates.
#[derive(Clone)]
pub struct PostgresRegistrationRepository {
    pool: PgPool,
}

impl PostgresRegistrationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RegistrationRow {
    id: uuid::Uuid,
    full_name: String,
    email: String,
    motivation_letter: Option<String>,
    status: String,
    interview_date: Option<DateTime<Utc>>,
    interviewer1_id: Option<uuid::Uuid>,
    interviewer2_id: Option<uuid::Uuid>,
    test_score: Option<f64>,
    interview1_score: Option<f64>,
    interview2_score: Option<f64>,
    final_score: Option<f64>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    version: i64,
}

fn stored_score(registration_id: uuid::Uuid, value: Option<f64>) -> AppResult<Option<Score>> {
    value
        .map(Score::new)
        .transpose()
        .map_err(|error| {
            AppError::Internal(format!(
                "registration '{registration_id}' has an invalid score: {error}"
            ))
        })
}

impl TryFrom<RegistrationRow> for Registration {
    type Error = AppError;

    fn try_from(row: RegistrationRow) -> Result<Self, Self::Error> {
        let status = RegistrationStatus::from_str(&row.status).map_err(|error| {
            AppError::Internal(format!("registration '{}' has an invalid status: {error}", row.id))
        })?;
        let version = u64::try_from(row.version).map_err(|_| {
            AppError::Internal(format!("registration '{}' has a negative version", row.id))
        })?;

        Ok(Self {
            id: RegistrationId::from_uuid(row.id),
            full_name: row.full_name,
            email: row.email,
            motivation_letter: row.motivation_letter,
            status,
            interview_date: row.interview_date,
            interviewer1_id: row.interviewer1_id.map(UserId::from_uuid),
            interviewer2_id: row.interviewer2_id.map(UserId::from_uuid),
            test_score: stored_score(row.id, row.test_score)?,
            interview1_score: stored_score(row.id, row.interview1_score)?,
            interview2_score: stored_score(row.id, row.interview2_score)?,
            final_score: row.final_score,
            notes: row.notes,
            created_at: row.created_at,
            version,
        })
    }
}

fn stored_version(version: u64) -> AppResult<i64> {
    i64::try_from(version)
        .map_err(|_| AppError::Validation(format!("registration version {version} is out of range")))
}

#[async_trait]
impl RegistrationRepository for PostgresRegistrationRepository {
    async fn insert_registration(&self, registration: Registration) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO registrations (
                id,
                full_name,
                email,
                motivation_letter,
                status,
                created_at,
                version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(registration.id.as_uuid())
        .bind(registration.full_name)
        .bind(registration.email)
        .bind(registration.motivation_letter)
        .bind(registration.status.as_str())
        .bind(registration.created_at)
        .bind(stored_version(registration.version)?)
        .execute(&self.pool)
        .await
        .map_err(|error| store_error("failed to insert registration", error))?;

        Ok(())
    }

    async fn find_registration(
        &self,
        registration_id: RegistrationId,
    ) -> AppResult<Option<Registration>> {
        sqlx::query_as::<_, RegistrationRow>(
            r#"
            SELECT *
            FROM registrations
            WHERE id = $1
            "#,
        )
        .bind(registration_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| store_error("failed to load registration", error))?
        .map(Registration::try_from)
        .transpose()
    }

    async fn list_registrations(&self, query: RegistrationQuery) -> AppResult<Vec<Registration>> {
        sqlx::query_as::<_, RegistrationRow>(
            r#"
            SELECT *
            FROM registrations
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(query.status.map(|status| status.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| store_error("failed to list registrations", error))?
        .into_iter()
        .map(Registration::try_from)
        .collect()
    }

    async fn update_registration(&self, registration: Registration) -> AppResult<Registration> {
        let registration_id = registration.id;
        let updated = sqlx::query_as::<_, RegistrationRow>(
            r#"
            UPDATE registrations
            SET status = $3,
                interview_date = $4,
                interviewer1_id = $5,
                interviewer2_id = $6,
                test_score = $7,
                interview1_score = $8,
                interview2_score = $9,
                final_score = $10,
                notes = $11,
                version = version + 1
            WHERE id = $1
              AND version = $2
            RETURNING *
            "#,
        )
        .bind(registration.id.as_uuid())
        .bind(stored_version(registration.version)?)
        .bind(registration.status.as_str())
        .bind(registration.interview_date)
        .bind(registration.interviewer1_id.map(|id| id.as_uuid()))
        .bind(registration.interviewer2_id.map(|id| id.as_uuid()))
        .bind(registration.test_score.map(|score| score.value()))
        .bind(registration.interview1_score.map(|score| score.value()))
        .bind(registration.interview2_score.map(|score| score.value()))
        .bind(registration.final_score)
        .bind(registration.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| store_error("failed to update registration", error))?;

        if let Some(row) = updated {
            return Registration::try_from(row);
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM registrations WHERE id = $1)",
        )
        .bind(registration_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| store_error("failed to check registration", error))?;

        if exists {
            Err(AppError::Conflict(format!(
                "registration '{registration_id}' was modified concurrently"
            )))
        } else {
            Err(AppError::NotFound(format!(
                "registration '{registration_id}' not found"
            )))
        }
    }
}
