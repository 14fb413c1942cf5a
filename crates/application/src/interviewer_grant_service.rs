use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use selecta_core::{AppError, AppResult};
use selecta_domain::{
    Actor, AuditAction, GrantPermission, Notification, NotificationKind, NotificationRecipient,
    PermissionGrant, UserId, validate_grant_expiry,
};
use tracing::info;

use crate::AuthorizationService;
use crate::best_effort::{dispatch_notification, record_audit_event};
use crate::clock::Clock;
use crate::keyed_lock::KeyedLocks;
use crate::selection_ports::{
    AuditEvent, AuditRepository, GrantQuery, GrantRepository, GrantUpsert,
    NotificationDispatcher, UserRepository,
};
use crate::store_timeout::bounded;

#[cfg(test)]
mod tests;

/// Grant projection with its activity evaluated at query time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewerAccessEntry {
    /// Stored grant row.
    pub grant: PermissionGrant,
    /// Whether the grant is in force now.
    pub is_active: bool,
    /// Whether the grant ran out without being revoked.
    pub is_lapsed: bool,
}

/// Time-boxed interviewer grant store.
#[derive(Clone)]
pub struct InterviewerGrantService {
    authorization_service: AuthorizationService,
    grant_repository: Arc<dyn GrantRepository>,
    user_repository: Arc<dyn UserRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    notification_dispatcher: Arc<dyn NotificationDispatcher>,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
    locks: Arc<KeyedLocks<UserId>>,
}

impl InterviewerGrantService {
    /// Creates a new grant service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        grant_repository: Arc<dyn GrantRepository>,
        user_repository: Arc<dyn UserRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        notification_dispatcher: Arc<dyn NotificationDispatcher>,
        clock: Arc<dyn Clock>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            authorization_service,
            grant_repository,
            user_repository,
            audit_repository,
            notification_dispatcher,
            clock,
            store_timeout,
            locks: Arc::new(KeyedLocks::default()),
        }
    }

    /// Grants interviewer access, refreshing the active grant when one exists.
    pub async fn grant(
        &self,
        actor: &Actor,
        target_user_id: UserId,
        expires_at: Option<DateTime<Utc>>,
    ) -> AppResult<PermissionGrant> {
        self.authorization_service.require_process_manager(actor)?;

        let now = self.clock.now();
        validate_grant_expiry(expires_at, now)?;
        self.require_member(target_user_id).await?;

        let _guard = self.locks.lock(target_user_id).await;
        let upsert = bounded(
            self.store_timeout,
            "store interviewer grant",
            self.grant_repository.upsert_active_grant(
                PermissionGrant::interview_access(target_user_id, actor.id(), now, expires_at),
                now,
            ),
        )
        .await?;

        let refreshed = matches!(upsert, GrantUpsert::Refreshed(_));
        let grant = upsert.into_grant();
        let expiry = grant
            .expires_at
            .map(|expires_at| expires_at.to_rfc3339())
            .unwrap_or_else(|| "never".to_owned());

        record_audit_event(
            self.audit_repository.as_ref(),
            self.store_timeout,
            AuditEvent {
                subject: actor.id().to_string(),
                action: AuditAction::InterviewerAccessGranted,
                resource_type: "permission_grant".to_owned(),
                resource_id: grant.grant_id.to_string(),
                detail: Some(format!(
                    "{} interviewer access for '{target_user_id}' until {expiry}",
                    if refreshed { "refreshed" } else { "granted" }
                )),
            },
        )
        .await;

        info!(
            actor = %actor.id(),
            target = %target_user_id,
            expires_at = %expiry,
            refreshed,
            "interviewer access granted"
        );

        dispatch_notification(
            self.notification_dispatcher.as_ref(),
            self.store_timeout,
            Notification {
                recipient: NotificationRecipient::Member {
                    user_id: target_user_id,
                },
                title: "Interviewer access granted".to_owned(),
                message: "You have been designated as an interviewer for the selection process."
                    .to_owned(),
                kind: NotificationKind::System,
                related_id: Some(grant.grant_id.to_string()),
            },
        )
        .await;

        Ok(grant)
    }

    /// Revokes the member's active interviewer grant.
    pub async fn revoke(&self, actor: &Actor, target_user_id: UserId) -> AppResult<PermissionGrant> {
        self.authorization_service.require_process_manager(actor)?;

        let _guard = self.locks.lock(target_user_id).await;
        let now = self.clock.now();
        let grant = bounded(
            self.store_timeout,
            "revoke interviewer grant",
            self.grant_repository.revoke_active_grant(
                target_user_id,
                GrantPermission::InterviewAccess,
                actor.id(),
                now,
            ),
        )
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "no active interviewer access for member '{target_user_id}'"
            ))
        })?;

        record_audit_event(
            self.audit_repository.as_ref(),
            self.store_timeout,
            AuditEvent {
                subject: actor.id().to_string(),
                action: AuditAction::InterviewerAccessRevoked,
                resource_type: "permission_grant".to_owned(),
                resource_id: grant.grant_id.to_string(),
                detail: Some(format!("revoked interviewer access for '{target_user_id}'")),
            },
        )
        .await;

        info!(actor = %actor.id(), target = %target_user_id, "interviewer access revoked");

        Ok(grant)
    }

    /// Returns whether the member currently holds interviewer access.
    pub async fn is_active(&self, user_id: UserId) -> AppResult<bool> {
        self.authorization_service.is_interviewer(user_id).await
    }

    /// Lists interviewer grants with their current activity.
    pub async fn list_interviewer_access(
        &self,
        actor: &Actor,
        query: GrantQuery,
    ) -> AppResult<Vec<InterviewerAccessEntry>> {
        self.authorization_service.require_process_manager(actor)?;

        let now = self.clock.now();
        let grants = bounded(
            self.store_timeout,
            "list interviewer grants",
            self.grant_repository.list_grants(query, now),
        )
        .await?;

        Ok(grants
            .into_iter()
            .filter(|grant| grant.permission == GrantPermission::InterviewAccess)
            .map(|grant| InterviewerAccessEntry {
                is_active: grant.is_active_at(now),
                is_lapsed: grant.is_lapsed_at(now),
                grant,
            })
            .collect())
    }

    /// Grant targets must exist and be active.
    async fn require_member(&self, user_id: UserId) -> AppResult<()> {
        let member = bounded(
            self.store_timeout,
            "load member",
            self.user_repository.find_member(user_id),
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("member '{user_id}' does not exist")))?;

        if !member.is_active() {
            return Err(AppError::Validation(format!("member '{user_id}' is not active")));
        }

        Ok(())
    }
}
