use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use selecta_application::{
    AuditEvent, AuditRepository, ChangeFeed, ChangeKind, ChangeNotification, GrantQuery,
    GrantRepository, GrantUpsert, RegistrationQuery, RegistrationRepository, SettingsRepository,
    StoreTable, UserRepository,
};
use selecta_core::{AppError, AppResult};
use selecta_domain::{
    GrantPermission, Member, PermissionGrant, ProcessGateState, Registration, RegistrationId,
    ScoreWeights, UserId,
};
use tokio::sync::{RwLock, broadcast};


const CHANGE_FEED_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, Default)]
struct SiteSettings {
    process_gate: ProcessGateState,
    score_weights: ScoreWeights,
}

/// In-memory implementation of every selection repository and the change
/// feed.
///
/// Each table sits behind its own lock, so every mutation is atomic with
/// respect to reads of the same table.
#[derive(Debug)]
pub struct InMemorySelectionStore {
    members: RwLock<HashMap<UserId, Member>>,
    grants: RwLock<Vec<PermissionGrant>>,
    registrations: RwLock<HashMap<RegistrationId, Registration>>,
    settings: RwLock<SiteSettings>,
    audit_events: RwLock<Vec<AuditEvent>>,
    changes: broadcast::Sender<ChangeNotification>,
}

impl Default for InMemorySelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySelectionStore {
    /// Creates an empty store with a closed gate and default weights.
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            members: RwLock::new(HashMap::new()),
            grants: RwLock::new(Vec::new()),
            registrations: RwLock::new(HashMap::new()),
            settings: RwLock::new(SiteSettings::default()),
            audit_events: RwLock::new(Vec::new()),
            changes,
        }
    }

    /// Inserts or replaces a member account.
    pub async fn upsert_member(&self, member: Member) {
        let user_id = member.id();
        let previous = self.members.write().await.insert(user_id, member);
        let kind = if previous.is_some() {
            ChangeKind::Update
        } else {
            ChangeKind::Insert
        };
        self.announce(StoreTable::Users, kind, Some(user_id.to_string()));
    }

    /// Returns every audit event appended so far.
    pub async fn audit_events(&self) -> Vec<AuditEvent> {
        self.audit_events.read().await.clone()
    }

    fn announce(&self, table: StoreTable, kind: ChangeKind, record_id: Option<String>) {
        // No subscribers is not an error.
        let _ = self.changes.send(ChangeNotification {
            table,
            kind,
            record_id,
        });
    }
}

fn is_active_for(
    grant: &PermissionGrant,
    user_id: UserId,
    permission: GrantPermission,
    now: DateTime<Utc>,
) -> bool {
    grant.user_id == user_id && grant.permission == permission && grant.is_active_at(now)
}

#[async_trait]
impl UserRepository for InMemorySelectionStore {
    async fn find_member(&self, user_id: UserId) -> AppResult<Option<Member>> {
        Ok(self.members.read().await.get(&user_id).cloned())
    }

    async fn list_members(&self) -> AppResult<Vec<Member>> {
        let mut members: Vec<Member> = self.members.read().await.values().cloned().collect();
        members.sort_by(|left, right| left.name().as_str().cmp(right.name().as_str()));
        Ok(members)
    }
}

#[async_trait]
impl GrantRepository for InMemorySelectionStore {
    async fn find_active_grant(
        &self,
        user_id: UserId,
        permission: GrantPermission,
        now: DateTime<Utc>,
    ) -> AppResult<Option<PermissionGrant>> {
        Ok(self
            .grants
            .read()
            .await
            .iter()
            .find(|grant| is_active_for(grant, user_id, permission, now))
            .cloned())
    }

    async fn upsert_active_grant(
        &self,
        grant: PermissionGrant,
        now: DateTime<Utc>,
    ) -> AppResult<GrantUpsert> {
        let upsert = {
            let mut grants = self.grants.write().await;
            match grants
                .iter_mut()
                .find(|existing| is_active_for(existing, grant.user_id, grant.permission, now))
            {
                Some(existing) => {
                    existing.refresh(grant.granted_by, grant.granted_at, grant.expires_at);
                    GrantUpsert::Refreshed(existing.clone())
                }
                None => {
                    grants.push(grant.clone());
                    GrantUpsert::Created(grant)
                }
            }
        };

        let kind = match upsert {
            GrantUpsert::Created(_) => ChangeKind::Insert,
            GrantUpsert::Refreshed(_) => ChangeKind::Update,
        };
        self.announce(
            StoreTable::PermissionGrants,
            kind,
            Some(upsert.grant().grant_id.to_string()),
        );

        Ok(upsert)
    }

    async fn revoke_active_grant(
        &self,
        user_id: UserId,
        permission: GrantPermission,
        revoked_by: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Option<PermissionGrant>> {
        let revoked = {
            let mut grants = self.grants.write().await;
            grants
                .iter_mut()
                .find(|grant| is_active_for(grant, user_id, permission, now))
                .map(|grant| {
                    grant.revoke(revoked_by, now);
                    grant.clone()
                })
        };

        if let Some(grant) = &revoked {
            self.announce(
                StoreTable::PermissionGrants,
                ChangeKind::Update,
                Some(grant.grant_id.to_string()),
            );
        }

        Ok(revoked)
    }

    async fn list_grants(
        &self,
        query: GrantQuery,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<PermissionGrant>> {
        let mut grants: Vec<PermissionGrant> = self
            .grants
            .read()
            .await
            .iter()
            .filter(|grant| query.user_id.is_none_or(|user_id| grant.user_id == user_id))
            .filter(|grant| !query.active_only || grant.is_active_at(now))
            .cloned()
            .collect();
        grants.sort_by(|left, right| right.granted_at.cmp(&left.granted_at));
        Ok(grants)
    }
}

#[async_trait]
impl RegistrationRepository for InMemorySelectionStore {
    async fn insert_registration(&self, registration: Registration) -> AppResult<()> {
        let registration_id = registration.id;
        {
            let mut registrations = self.registrations.write().await;
            if registrations.contains_key(&registration_id) {
                return Err(AppError::Conflict(format!(
                    "registration '{registration_id}' already exists"
                )));
            }
            registrations.insert(registration_id, registration);
        }

        self.announce(
            StoreTable::Registrations,
            ChangeKind::Insert,
            Some(registration_id.to_string()),
        );
        Ok(())
    }

    async fn find_registration(
        &self,
        registration_id: RegistrationId,
    ) -> AppResult<Option<Registration>> {
        Ok(self.registrations.read().await.get(&registration_id).cloned())
    }

    async fn list_registrations(&self, query: RegistrationQuery) -> AppResult<Vec<Registration>> {
        let mut registrations: Vec<Registration> = self
            .registrations
            .read()
            .await
            .values()
            .filter(|registration| query.status.is_none_or(|status| registration.status == status))
            .cloned()
            .collect();
        registrations.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(registrations)
    }

    async fn update_registration(&self, registration: Registration) -> AppResult<Registration> {
        let registration_id = registration.id;
        let updated = {
            let mut registrations = self.registrations.write().await;
            let Some(stored) = registrations.get_mut(&registration_id) else {
                return Err(AppError::NotFound(format!(
                    "registration '{registration_id}' not found"
                )));
            };
            if stored.version != registration.version {
                return Err(AppError::Conflict(format!(
                    "registration '{registration_id}' was modified concurrently"
                )));
            }

            let mut updated = registration;
            updated.version += 1;
            *stored = updated.clone();
            updated
        };

        self.announce(
            StoreTable::Registrations,
            ChangeKind::Update,
            Some(registration_id.to_string()),
        );
        Ok(updated)
    }
}

#[async_trait]
impl SettingsRepository for InMemorySelectionStore {
    async fn process_gate(&self) -> AppResult<ProcessGateState> {
        Ok(self.settings.read().await.process_gate)
    }

    async fn save_process_gate(&self, state: ProcessGateState) -> AppResult<()> {
        self.settings.write().await.process_gate = state;
        self.announce(StoreTable::SiteSettings, ChangeKind::Update, None);
        Ok(())
    }

    async fn score_weights(&self) -> AppResult<ScoreWeights> {
        Ok(self.settings.read().await.score_weights)
    }

    async fn save_score_weights(
        &self,
        weights: ScoreWeights,
        _updated_by: UserId,
        _updated_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.settings.write().await.score_weights = weights;
        self.announce(StoreTable::SiteSettings, ChangeKind::Update, None);
        Ok(())
    }
}

#[async_trait]
impl AuditRepository for InMemorySelectionStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.audit_events.write().await.push(event);
        Ok(())
    }
}

#[async_trait]
impl ChangeFeed for InMemorySelectionStore {
    async fn subscribe(&self) -> AppResult<broadcast::Receiver<ChangeNotification>> {
        Ok(self.changes.subscribe())
    }
}
