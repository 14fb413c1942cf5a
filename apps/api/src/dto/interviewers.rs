use chrono::{DateTime, Utc};
use selecta_application::{GrantQuery, InterviewerAccessEntry};
use selecta_domain::{PermissionGrant, UserId};
use serde::{Deserialize, Serialize};

/// Incoming payload for granting interviewer access.
#[derive(Debug, Deserialize)]
pub struct GrantInterviewerRequest {
    pub user_id: UserId,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Query string for interviewer access listing.
#[derive(Debug, Default, Deserialize)]
pub struct InterviewerAccessQuery {
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub active_only: bool,
}

/// API representation of one interviewer grant.
#[derive(Debug, Serialize)]
pub struct InterviewerAccessResponse {
    pub grant_id: String,
    pub user_id: String,
    pub permission: String,
    pub granted_by: String,
    pub granted_at: String,
    pub expires_at: Option<String>,
    pub revoked_at: Option<String>,
    pub revoked_by: Option<String>,
    pub is_active: bool,
    pub is_lapsed: bool,
}

/// Whether a member currently holds interviewer access.
#[derive(Debug, Serialize)]
pub struct InterviewerStatusResponse {
    pub user_id: String,
    pub is_interviewer: bool,
}

impl From<InterviewerAccessQuery> for GrantQuery {
    fn from(value: InterviewerAccessQuery) -> Self {
        Self {
            user_id: value.user_id,
            active_only: value.active_only,
        }
    }
}

impl InterviewerAccessResponse {
    /// Builds a response for a grant whose activity was evaluated elsewhere.
    #[must_use]
    pub fn from_grant(grant: PermissionGrant, is_active: bool, is_lapsed: bool) -> Self {
        Self {
            grant_id: grant.grant_id.to_string(),
            user_id: grant.user_id.to_string(),
            permission: grant.permission.as_str().to_owned(),
            granted_by: grant.granted_by.to_string(),
            granted_at: grant.granted_at.to_rfc3339(),
            expires_at: grant.expires_at.map(|value| value.to_rfc3339()),
            revoked_at: grant.revoked_at.map(|value| value.to_rfc3339()),
            revoked_by: grant.revoked_by.map(|value| value.to_string()),
            is_active,
            is_lapsed,
        }
    }
}

impl From<InterviewerAccessEntry> for InterviewerAccessResponse {
    fn from(value: InterviewerAccessEntry) -> Self {
        Self::from_grant(value.grant, value.is_active, value.is_lapsed)
    }
}
