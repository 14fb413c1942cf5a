use async_trait::async_trait;
use chrono::{DateTime, Utc};
use selecta_core::AppResult;
use selecta_domain::{GrantPermission, PermissionGrant, UserId};

/// Outcome of an atomic grant upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantUpsert {
    /// No active grant existed; a new row was written.
    Created(PermissionGrant),
    /// The active grant was refreshed in place.
    Refreshed(PermissionGrant),
}

impl GrantUpsert {
    /// Returns the stored grant.
    #[must_use]
    pub fn grant(&self) -> &PermissionGrant {
        match self {
            Self::Created(grant) | Self::Refreshed(grant) => grant,
        }
    }

    /// Consumes the outcome and returns the stored grant.
    #[must_use]
    pub fn into_grant(self) -> PermissionGrant {
        match self {
            Self::Created(grant) | Self::Refreshed(grant) => grant,
        }
    }
}

/// Query parameters for grant listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GrantQuery {
    /// Optional member filter.
    pub user_id: Option<UserId>,
    /// Whether to return only grants active at the query time.
    pub active_only: bool,
}

/// Store of time-boxed permission grants.
///
/// Implementations must keep at most one active grant per
/// `(user, permission)` under concurrent calls, and every read must observe
/// either the pre- or post-mutation state of a row.
#[async_trait]
pub trait GrantRepository: Send + Sync {
    /// Finds the grant active at `now`, if any.
    async fn find_active_grant(
        &self,
        user_id: UserId,
        permission: GrantPermission,
        now: DateTime<Utc>,
    ) -> AppResult<Option<PermissionGrant>>;

    /// Atomically refreshes the active grant for the same user and
    /// permission, or stores `grant` when none is active at `now`.
    async fn upsert_active_grant(
        &self,
        grant: PermissionGrant,
        now: DateTime<Utc>,
    ) -> AppResult<GrantUpsert>;

    /// Atomically revokes the grant active at `now`; `None` when none is.
    async fn revoke_active_grant(
        &self,
        user_id: UserId,
        permission: GrantPermission,
        revoked_by: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Option<PermissionGrant>>;

    /// Lists grants, newest first.
    async fn list_grants(
        &self,
        query: GrantQuery,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<PermissionGrant>>;
}
