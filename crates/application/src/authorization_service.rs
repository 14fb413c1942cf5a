use std::sync::Arc;
use std::time::Duration;

use selecta_core::{AppError, AppResult};
use selecta_domain::{
    Action, Actor, AuditAction, GrantPermission, PermissionGrant, Resource, ResourceAction,
    UserId, has_static_permission,
};

use crate::clock::Clock;
use crate::selection_ports::{AuditEvent, AuditRepository, GrantRepository};
use crate::store_timeout::bounded;


/// How an actor was cleared for interview work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterviewClearance {
    /// The actor's role manages the selection process.
    ProcessManager,
    /// The actor holds an active interviewer grant.
    Grant(PermissionGrant),
}

/// Access controller combining the static role authority with active grants.
#[derive(Clone)]
pub struct AuthorizationService {
    grant_repository: Arc<dyn GrantRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
}

impl AuthorizationService {
    /// Creates a new authorization service.
    #[must_use]
    pub fn new(
        grant_repository: Arc<dyn GrantRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        clock: Arc<dyn Clock>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            grant_repository,
            audit_repository,
            clock,
            store_timeout,
        }
    }

    /// Returns whether the actor may perform `action` on `resource` now.
    ///
    /// Fails closed: pairs absent from the role table are denied, and
    /// `candidates:interview` additionally needs process management or an
    /// active interviewer grant.
    pub async fn check_permission(
        &self,
        actor: &Actor,
        resource: Resource,
        action: Action,
    ) -> AppResult<bool> {
        if !has_static_permission(actor.role(), resource, action) {
            return Ok(false);
        }

        if !ResourceAction::new(resource, action).is_interview() || actor.can_manage_process() {
            return Ok(true);
        }

        self.is_interviewer(actor.id()).await
    }

    /// Ensures the actor may perform `action` on `resource`.
    pub async fn require_permission(
        &self,
        actor: &Actor,
        resource: Resource,
        action: Action,
    ) -> AppResult<()> {
        let capability = ResourceAction::new(resource, action);
        if capability.is_interview() {
            return self.require_interview_access(actor).await.map(|_| ());
        }

        if self.check_permission(actor, resource, action).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "missing permission '{capability}'"
        )))
    }

    /// Ensures the actor's role manages the selection process.
    pub fn require_process_manager(&self, actor: &Actor) -> AppResult<()> {
        if actor.can_manage_process() {
            return Ok(());
        }

        Err(AppError::Forbidden(
            "process management required (President, Vice-President or Superadmin)".to_owned(),
        ))
    }

    /// Returns whether the member holds an active interviewer grant.
    pub async fn is_interviewer(&self, user_id: UserId) -> AppResult<bool> {
        Ok(self.find_active_interviewer_grant(user_id).await?.is_some())
    }

    /// Ensures the actor may conduct interviews and reports how.
    ///
    /// Reliance on a grant is recorded in the audit trail.
    pub async fn require_interview_access(&self, actor: &Actor) -> AppResult<InterviewClearance> {
        if actor.can_manage_process() {
            return Ok(InterviewClearance::ProcessManager);
        }

        let Some(grant) = self.find_active_interviewer_grant(actor.id()).await? else {
            return Err(AppError::Forbidden("interviewer access required".to_owned()));
        };

        bounded(
            self.store_timeout,
            "append interviewer access audit event",
            self.audit_repository.append_event(AuditEvent {
                subject: actor.id().to_string(),
                action: AuditAction::InterviewerAccessUsed,
                resource_type: "permission_grant".to_owned(),
                resource_id: grant.grant_id.to_string(),
                detail: Some(format!(
                    "used interviewer grant (expires_at={})",
                    grant
                        .expires_at
                        .map(|expires_at| expires_at.to_rfc3339())
                        .unwrap_or_else(|| "never".to_owned())
                )),
            }),
        )
        .await?;

        Ok(InterviewClearance::Grant(grant))
    }

    async fn find_active_interviewer_grant(
        &self,
        user_id: UserId,
    ) -> AppResult<Option<PermissionGrant>> {
        let now = self.clock.now();
        let grant = bounded(
            self.store_timeout,
            "load interviewer grant",
            self.grant_repository.find_active_grant(
                user_id,
                GrantPermission::InterviewAccess,
                now,
            ),
        )
        .await?;

        // Expiry is always judged against the service clock.
        Ok(grant.filter(|grant| grant.is_active_at(now)))
    }
}
