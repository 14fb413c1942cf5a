//! Fake ports shared by the service tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Mutex;

use selecta_core::{AppError, AppResult};
use selecta_domain::{
    Actor, GrantPermission, Member, Notification, PermissionGrant, ProcessGateState,
    Registration, RegistrationId, Role, ScoreWeights, UserId,
};

use crate::ServiceConfig;
use crate::clock::Clock;
use crate::selection_ports::{
    AuditEvent, AuditRepository, GrantQuery, GrantRepository, GrantUpsert,
    NotificationDispatcher, RegistrationQuery, RegistrationRepository, SelectionPorts,
    SettingsRepository, UserRepository,
};

pub(crate) struct ManualClock {
    now: std::sync::Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub(crate) fn new() -> Self {
        Self {
            now: std::sync::Mutex::new(
                Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
                    .single()
                    .unwrap_or_else(Utc::now),
            ),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|error| error.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|error| error.into_inner())
    }
}

#[derive(Default)]
pub(crate) struct FakeStore {
    members: Mutex<HashMap<UserId, Member>>,
    grants: Mutex<Vec<PermissionGrant>>,
    registrations: Mutex<HashMap<RegistrationId, Registration>>,
    gate: Mutex<ProcessGateState>,
    weights: Mutex<ScoreWeights>,
    pub(crate) audit_events: Mutex<Vec<AuditEvent>>,
    pub(crate) notifications: Mutex<Vec<Notification>>,
    pub(crate) settings_unavailable: AtomicBool,
    pub(crate) notifications_failing: AtomicBool,
    pub(crate) audit_failing: AtomicBool,
}

impl FakeStore {
    pub(crate) async fn add_member(&self, role: Role) -> Actor {
        self.add_member_with_status(role, true).await
    }

    pub(crate) async fn add_member_with_status(&self, role: Role, is_active: bool) -> Actor {
        let id = UserId::new();
        let member = Member::new(
            id,
            format!("{} {}", role.display_name(), &id.to_string()[..8]),
            format!("{}@example.org", &id.to_string()[..8]),
            role,
            is_active,
        )
        .unwrap_or_else(|_| unreachable!());
        let actor = member.actor();
        self.members.lock().await.insert(id, member);
        actor
    }

    pub(crate) async fn grant_rows(&self, user_id: UserId) -> Vec<PermissionGrant> {
        self.grants
            .lock()
            .await
            .iter()
            .filter(|grant| grant.user_id == user_id)
            .cloned()
            .collect()
    }

    pub(crate) async fn stored_registration(&self, id: RegistrationId) -> Option<Registration> {
        self.registrations.lock().await.get(&id).cloned()
    }

    pub(crate) async fn seed_registration(&self, registration: Registration) {
        self.registrations
            .lock()
            .await
            .insert(registration.id, registration);
    }

    fn settings_available(&self) -> AppResult<()> {
        if self.settings_unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Unavailable("settings store offline".to_owned()));
        }
        Ok(())
    }
}

pub(crate) fn ports(store: &Arc<FakeStore>) -> SelectionPorts {
    SelectionPorts {
        users: store.clone(),
        grants: store.clone(),
        registrations: store.clone(),
        settings: store.clone(),
        notifications: store.clone(),
        audit: store.clone(),
    }
}

pub(crate) fn config() -> ServiceConfig {
    ServiceConfig {
        store_timeout: std::time::Duration::from_secs(1),
        gate_staleness: std::time::Duration::from_secs(60),
        mirror_reload_interval: std::time::Duration::from_secs(300),
    }
}

#[async_trait]
impl UserRepository for FakeStore {
    async fn find_member(&self, user_id: UserId) -> AppResult<Option<Member>> {
        Ok(self.members.lock().await.get(&user_id).cloned())
    }

    async fn list_members(&self) -> AppResult<Vec<Member>> {
        Ok(self.members.lock().await.values().cloned().collect())
    }
}

#[async_trait]
impl GrantRepository for FakeStore {
    async fn find_active_grant(
        &self,
        user_id: UserId,
        permission: GrantPermission,
        now: DateTime<Utc>,
    ) -> AppResult<Option<PermissionGrant>> {
        Ok(self
            .grants
            .lock()
            .await
            .iter()
            .find(|grant| {
                grant.user_id == user_id && grant.permission == permission && grant.is_active_at(now)
            })
            .cloned())
    }

    async fn upsert_active_grant(
        &self,
        grant: PermissionGrant,
        now: DateTime<Utc>,
    ) -> AppResult<GrantUpsert> {
        let mut grants = self.grants.lock().await;
        if let Some(existing) = grants.iter_mut().find(|existing| {
            existing.user_id == grant.user_id
                && existing.permission == grant.permission
                && existing.is_active_at(now)
        }) {
            existing.refresh(grant.granted_by, grant.granted_at, grant.expires_at);
            return Ok(GrantUpsert::Refreshed(existing.clone()));
        }

        grants.push(grant.clone());
        Ok(GrantUpsert::Created(grant))
    }

    async fn revoke_active_grant(
        &self,
        user_id: UserId,
        permission: GrantPermission,
        revoked_by: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Option<PermissionGrant>> {
        let mut grants = self.grants.lock().await;
        Ok(grants
            .iter_mut()
            .find(|grant| {
                grant.user_id == user_id && grant.permission == permission && grant.is_active_at(now)
            })
            .map(|grant| {
                grant.revoke(revoked_by, now);
                grant.clone()
            }))
    }

    async fn list_grants(
        &self,
        query: GrantQuery,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<PermissionGrant>> {
        let mut listed: Vec<PermissionGrant> = self
            .grants
            .lock()
            .await
            .iter()
            .filter(|grant| query.user_id.is_none_or(|user_id| grant.user_id == user_id))
            .filter(|grant| !query.active_only || grant.is_active_at(now))
            .cloned()
            .collect();
        listed.sort_by(|left, right| right.granted_at.cmp(&left.granted_at));
        Ok(listed)
    }
}

#[async_trait]
impl RegistrationRepository for FakeStore {
    async fn insert_registration(&self, registration: Registration) -> AppResult<()> {
        self.registrations
            .lock()
            .await
            .insert(registration.id, registration);
        Ok(())
    }

    async fn find_registration(
        &self,
        registration_id: RegistrationId,
    ) -> AppResult<Option<Registration>> {
        Ok(self.registrations.lock().await.get(&registration_id).cloned())
    }

    async fn list_registrations(&self, query: RegistrationQuery) -> AppResult<Vec<Registration>> {
        let mut listed: Vec<Registration> = self
            .registrations
            .lock()
            .await
            .values()
            .filter(|registration| query.status.is_none_or(|status| registration.status == status))
            .cloned()
            .collect();
        listed.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(listed)
    }

    async fn update_registration(&self, registration: Registration) -> AppResult<Registration> {
        let mut registrations = self.registrations.lock().await;
        let Some(stored) = registrations.get_mut(&registration.id) else {
            return Err(AppError::NotFound("registration".to_owned()));
        };
        if stored.version != registration.version {
            return Err(AppError::Conflict("registration version changed".to_owned()));
        }

        let mut updated = registration;
        updated.version += 1;
        *stored = updated.clone();
        Ok(updated)
    }
}

#[async_trait]
impl SettingsRepository for FakeStore {
    async fn process_gate(&self) -> AppResult<ProcessGateState> {
        self.settings_available()?;
        Ok(*self.gate.lock().await)
    }

    async fn save_process_gate(&self, state: ProcessGateState) -> AppResult<()> {
        self.settings_available()?;
        *self.gate.lock().await = state;
        Ok(())
    }

    async fn score_weights(&self) -> AppResult<ScoreWeights> {
        self.settings_available()?;
        Ok(*self.weights.lock().await)
    }

    async fn save_score_weights(
        &self,
        weights: ScoreWeights,
        _updated_by: UserId,
        _updated_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.settings_available()?;
        *self.weights.lock().await = weights;
        Ok(())
    }
}

#[async_trait]
impl AuditRepository for FakeStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        if self.audit_failing.load(Ordering::SeqCst) {
            return Err(AppError::Unavailable("audit store offline".to_owned()));
        }
        self.audit_events.lock().await.push(event);
        Ok(())
    }
}

#[async_trait]
impl NotificationDispatcher for FakeStore {
    async fn dispatch(&self, notification: Notification) -> AppResult<()> {
        if self.notifications_failing.load(Ordering::SeqCst) {
            return Err(AppError::Unavailable("notification channel offline".to_owned()));
        }
        self.notifications.lock().await.push(notification);
        Ok(())
    }
}
