use async_trait::async_trait;
use selecta_core::AppResult;
use selecta_domain::AuditAction;

/// Audit event payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Acting subject: a member id, or `public` for anonymous intake.
    pub subject: String,
    /// Stable action identifier.
    pub action: AuditAction,
    /// Resource type affected by the action.
    pub resource_type: String,
    /// Resource identifier affected by the action.
    pub resource_id: String,
    /// Optional event detail.
    pub detail: Option<String>,
}

/// Append-only audit sink.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Appends one audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}
