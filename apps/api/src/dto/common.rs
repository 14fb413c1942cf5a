use selecta_domain::Member;
use serde::{Deserialize, Serialize};

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub process_open: bool,
    pub mirror_loaded_at: Option<String>,
}

/// Member directory entry.
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub role_display_name: &'static str,
    pub is_active: bool,
}

/// Query string for permission checks.
#[derive(Debug, Deserialize)]
pub struct PermissionCheckQuery {
    pub resource: String,
    pub action: String,
}

/// Result of a permission check.
#[derive(Debug, Serialize)]
pub struct PermissionCheckResponse {
    pub resource: String,
    pub action: String,
    pub allowed: bool,
}

impl From<Member> for MemberResponse {
    fn from(value: Member) -> Self {
        Self {
            user_id: value.id().to_string(),
            name: value.name().as_str().to_owned(),
            email: value.email().as_str().to_owned(),
            role: value.role().as_str().to_owned(),
            role_display_name: value.role().display_name(),
            is_active: value.is_active(),
        }
    }
}
