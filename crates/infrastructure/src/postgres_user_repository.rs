use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use selecta_application::UserRepository;
use selecta_core::{AppError, AppResult};
use selecta_domain::{Member, Role, UserId};

use crate::postgres_error::store_error;

/// PostgreSQL-backed member directory.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MemberRow {
    id: uuid::Uuid,
    name: String,
    email: String,
    role: String,
    is_active: bool,
}

impl TryFrom<MemberRow> for Member {
    type Error = AppError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role).map_err(|error| {
            AppError::Internal(format!("member '{}' has an invalid role: {error}", row.id))
        })?;
        Member::new(
            UserId::from_uuid(row.id),
            row.name,
            row.email,
            role,
            row.is_active,
        )
        .map_err(|error| AppError::Internal(format!("member '{}' is malformed: {error}", row.id)))
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_member(&self, user_id: UserId) -> AppResult<Option<Member>> {
        sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, name, email, role, is_active
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| store_error("failed to load member", error))?
        .map(Member::try_from)
        .transpose()
    }

    async fn list_members(&self) -> AppResult<Vec<Member>> {
        sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, name, email, role, is_active
            FROM users
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| store_error("failed to list members", error))?
        .into_iter()
        .map(Member::try_from)
        .collect()
    }
}
