use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use selecta_application::{GrantQuery, GrantRepository, GrantUpsert};
use selecta_core::{AppError, AppResult};
use selecta_domain::{GrantId, GrantPermission, PermissionGrant, UserId};

use crate::postgres_error::store_error;

/// PostgreSQL-backed interviewer grant store.
///
/// Mutations for one `(user, permission)` pair serialise on a
/// transaction-scoped advisory lock.
#[derive(Clone)]
pub struct PostgresGrantRepository {
    pool: PgPool,
}

impl PostgresGrantRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin_locked(
        &self,
        user_id: UserId,
        permission: GrantPermission,
    ) -> AppResult<Transaction<'_, Postgres>> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| store_error("failed to begin transaction", error))?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("{}:{}", user_id, permission.as_str()))
            .execute(&mut *transaction)
            .await
            .map_err(|error| store_error("failed to lock grant key", error))?;

        Ok(transaction)
    }
}

#[derive(Debug, FromRow)]
struct GrantRow {
    id: uuid::Uuid,
    user_id: uuid::Uuid,
    permission: String,
    granted_by: uuid::Uuid,
    granted_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    revoked_at: Option<DateTime<Utc>>,
    revoked_by: Option<uuid::Uuid>,
}

impl TryFrom<GrantRow> for PermissionGrant {
    type Error = AppError;

    fn try_from(row: GrantRow) -> Result<Self, Self::Error> {
        let permission = GrantPermission::from_str(&row.permission).map_err(|error| {
            AppError::Internal(format!("grant '{}' has an invalid permission: {error}", row.id))
        })?;

        Ok(Self {
            grant_id: GrantId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            permission,
            granted_by: UserId::from_uuid(row.granted_by),
            granted_at: row.granted_at,
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
            revoked_by: row.revoked_by.map(UserId::from_uuid),
        })
    }
}

const ACTIVE_GRANT_QUERY: &str = r#"
    SELECT id, user_id, permission, granted_by, granted_at, expires_at, revoked_at, revoked_by
    FROM permission_grants
    WHERE user_id = $1
      AND permission = $2
      AND revoked_at IS NULL
      AND (expires_at IS NULL OR expires_at > $3)
    ORDER BY granted_at DESC
    LIMIT 1
"#;

#[async_trait]
impl GrantRepository for PostgresGrantRepository {
    async fn find_active_grant(
        &self,
        user_id: UserId,
        permission: GrantPermission,
        now: DateTime<Utc>,
    ) -> AppResult<Option<PermissionGrant>> {
        sqlx::query_as::<_, GrantRow>(ACTIVE_GRANT_QUERY)
            .bind(user_id.as_uuid())
            .bind(permission.as_str())
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| store_error("failed to load active grant", error))?
            .map(PermissionGrant::try_from)
            .transpose()
    }

    async fn upsert_active_grant(
        &self,
        grant: PermissionGrant,
        now: DateTime<Utc>,
    ) -> AppResult<GrantUpsert> {
        let mut transaction = self.begin_locked(grant.user_id, grant.permission).await?;

        let existing = sqlx::query_as::<_, GrantRow>(ACTIVE_GRANT_QUERY)
            .bind(grant.user_id.as_uuid())
            .bind(grant.permission.as_str())
            .bind(now)
            .fetch_optional(&mut *transaction)
            .await
            .map_err(|error| store_error("failed to load active grant", error))?;

        let upsert = match existing {
            Some(existing) => {
                let row = sqlx::query_as::<_, GrantRow>(
                    r#"
                    UPDATE permission_grants
                    SET granted_by = $2,
                        granted_at = $3,
                        expires_at = $4
                    WHERE id = $1
                    RETURNING id, user_id, permission, granted_by, granted_at,
                              expires_at, revoked_at, revoked_by
                    "#,
                )
                .bind(existing.id)
                .bind(grant.granted_by.as_uuid())
                .bind(grant.granted_at)
                .bind(grant.expires_at)
                .fetch_one(&mut *transaction)
                .await
                .map_err(|error| store_error("failed to refresh grant", error))?;
                GrantUpsert::Refreshed(PermissionGrant::try_from(row)?)
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO permission_grants (
                        id,
                        user_id,
                        permission,
                        granted_by,
                        granted_at,
                        expires_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(grant.grant_id.as_uuid())
                .bind(grant.user_id.as_uuid())
                .bind(grant.permission.as_str())
                .bind(grant.granted_by.as_uuid())
                .bind(grant.granted_at)
                .bind(grant.expires_at)
                .execute(&mut *transaction)
                .await
                .map_err(|error| store_error("failed to create grant", error))?;
                GrantUpsert::Created(grant)
            }
        };

        transaction
            .commit()
            .await
            .map_err(|error| store_error("failed to commit transaction", error))?;

        Ok(upsert)
    }

    async fn revoke_active_grant(
        &self,
        user_id: UserId,
        permission: GrantPermission,
        revoked_by: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Option<PermissionGrant>> {
        let mut transaction = self.begin_locked(user_id, permission).await?;

        let revoked = sqlx::query_as::<_, GrantRow>(
            r#"
            UPDATE permission_grants
            SET revoked_at = $3,
                revoked_by = $4
            WHERE id = (
                SELECT id
                FROM permission_grants
                WHERE user_id = $1
                  AND permission = $2
                  AND revoked_at IS NULL
                  AND (expires_at IS NULL OR expires_at > $3)
                ORDER BY granted_at DESC
                LIMIT 1
            )
            RETURNING id, user_id, permission, granted_by, granted_at,
                      expires_at, revoked_at, revoked_by
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(permission.as_str())
        .bind(now)
        .bind(revoked_by.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| store_error("failed to revoke grant", error))?;

        transaction
            .commit()
            .await
            .map_err(|error| store_error("failed to commit transaction", error))?;

        revoked.map(PermissionGrant::try_from).transpose()
    }

    async fn list_grants(
        &self,
        query: GrantQuery,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<PermissionGrant>> {
        sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT id, user_id, permission, granted_by, granted_at, expires_at, revoked_at, revoked_by
            FROM permission_grants
            WHERE ($1::UUID IS NULL OR user_id = $1)
              AND (
                  NOT $2
                  OR (revoked_at IS NULL AND (expires_at IS NULL OR expires_at > $3))
              )
            ORDER BY granted_at DESC
            "#,
        )
        .bind(query.user_id.map(|user_id| user_id.as_uuid()))
        .bind(query.active_only)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| store_error("failed to list grants", error))?
        .into_iter()
        .map(PermissionGrant::try_from)
        .collect()
    }
}
