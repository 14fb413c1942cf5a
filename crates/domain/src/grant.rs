use std::str::FromStr;

use chrono::{DateTime, Utc};
use selecta_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Resource, UserId};

/// Unique identifier for a permission grant row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrantId(Uuid);

impl GrantId {
    /// Creates a new random grant identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a grant identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for GrantId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GrantId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Delegable permission kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantPermission {
    /// Temporary interviewer status on candidates.
    InterviewAccess,
}

impl GrantPermission {
    /// Returns a stable storage value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InterviewAccess => "interview_access",
        }
    }

    /// Returns the resource the permission applies to.
    #[must_use]
    pub fn resource(&self) -> Resource {
        match self {
            Self::InterviewAccess => Resource::Candidates,
        }
    }
}

impl FromStr for GrantPermission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "interview_access" => Ok(Self::InterviewAccess),
            _ => Err(AppError::Validation(format!(
                "unknown grant permission value '{value}'"
            ))),
        }
    }
}

/// Time-boxed, revocable elevation of one member.
///
/// Rows are never deleted; revocation stamps `revoked_at` and expiry is
/// evaluated at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Stable grant id.
    pub grant_id: GrantId,
    /// Member receiving the permission.
    pub user_id: UserId,
    /// Granted permission kind.
    pub permission: GrantPermission,
    /// Member who issued or last refreshed the grant.
    pub granted_by: UserId,
    /// Issue timestamp.
    pub granted_at: DateTime<Utc>,
    /// Optional expiry; `None` never lapses.
    pub expires_at: Option<DateTime<Utc>>,
    /// Revocation timestamp, when revoked.
    pub revoked_at: Option<DateTime<Utc>>,
    /// Member who revoked the grant, when revoked.
    pub revoked_by: Option<UserId>,
}

impl PermissionGrant {
    /// Creates a fresh interviewer grant.
    #[must_use]
    pub fn interview_access(
        user_id: UserId,
        granted_by: UserId,
        granted_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            grant_id: GrantId::new(),
            user_id,
            permission: GrantPermission::InterviewAccess,
            granted_by,
            granted_at,
            expires_at,
            revoked_at: None,
            revoked_by: None,
        }
    }

    /// Returns the resource this grant applies to.
    #[must_use]
    pub fn resource(&self) -> Resource {
        self.permission.resource()
    }

    /// Returns whether the grant is in force at `now`.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at.is_none_or(|expires_at| expires_at > now)
    }

    /// Returns whether the grant lapsed by expiry without being revoked.
    #[must_use]
    pub fn is_lapsed_at(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    /// Refreshes an active grant in place with a new issuer and expiry.
    pub fn refresh(
        &mut self,
        granted_by: UserId,
        granted_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) {
        self.granted_by = granted_by;
        self.granted_at = granted_at;
        self.expires_at = expires_at;
    }

    /// Marks the grant revoked.
    pub fn revoke(&mut self, revoked_by: UserId, revoked_at: DateTime<Utc>) {
        self.revoked_at = Some(revoked_at);
        self.revoked_by = Some(revoked_by);
    }
}

/// Validates a requested grant expiry against the current time.
pub fn validate_grant_expiry(
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> AppResult<()> {
    match expires_at {
        Some(expires_at) if expires_at <= now => Err(AppError::InvalidExpiry(format!(
            "expires_at '{}' must be in the future",
            expires_at.to_rfc3339()
        ))),
        _ => Ok(()),
    }
}
