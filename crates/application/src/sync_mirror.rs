use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use selecta_core::AppResult;
use selecta_domain::{
    Member, PermissionGrant, ProcessGateState, Registration, RegistrationId, ScoreWeights, UserId,
};
use tokio::sync::RwLock;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::ProcessGate;
use crate::clock::Clock;
use crate::selection_ports::{
    ChangeFeed, ChangeNotification, GrantQuery, GrantRepository, RegistrationQuery,
    RegistrationRepository, SelectionPorts, SettingsRepository, StoreTable, UserRepository,
};
use crate::store_timeout::bounded;

/// In-memory read model of the persistent store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MirrorSnapshot {
    /// Members by id.
    pub members: HashMap<UserId, Member>,
    /// Registrations by id.
    pub registrations: HashMap<RegistrationId, Registration>,
    /// Every permission grant, newest first.
    pub grants: Vec<PermissionGrant>,
    /// Canonical gate state.
    pub process_gate: ProcessGateState,
    /// Stored score weights.
    pub score_weights: ScoreWeights,
    /// Time of the last successful full reload.
    pub loaded_at: Option<DateTime<Utc>>,
}

/// Keeps a [`MirrorSnapshot`] consistent with the store.
///
/// Every reload replaces whole tables, so applying the same state twice
/// is harmless and a missed or repeated notification is repaired by the
/// next full reload.
#[derive(Clone)]
pub struct SyncMirror {
    user_repository: Arc<dyn UserRepository>,
    registration_repository: Arc<dyn RegistrationRepository>,
    grant_repository: Arc<dyn GrantRepository>,
    settings_repository: Arc<dyn SettingsRepository>,
    change_feed: Arc<dyn ChangeFeed>,
    process_gate: ProcessGate,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
    reload_interval: Duration,
    snapshot: Arc<RwLock<MirrorSnapshot>>,
}

impl SyncMirror {
    /// Creates an empty mirror.
    #[must_use]
    pub fn new(
        ports: &SelectionPorts,
        change_feed: Arc<dyn ChangeFeed>,
        process_gate: ProcessGate,
        clock: Arc<dyn Clock>,
        store_timeout: Duration,
        reload_interval: Duration,
    ) -> Self {
        Self {
            user_repository: ports.users.clone(),
            registration_repository: ports.registrations.clone(),
            grant_repository: ports.grants.clone(),
            settings_repository: ports.settings.clone(),
            change_feed,
            process_gate,
            clock,
            store_timeout,
            reload_interval,
            snapshot: Arc::new(RwLock::new(MirrorSnapshot::default())),
        }
    }

    /// Returns a copy of the current read model.
    pub async fn snapshot(&self) -> MirrorSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Returns when the last full reload completed.
    pub async fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot.read().await.loaded_at
    }

    /// Reloads every table.
    ///
    /// Tables are fetched before the snapshot is touched; a failure leaves
    /// the previous snapshot in place.
    pub async fn reload_all(&self) -> AppResult<()> {
        let members = self.load_members().await?;
        let registrations = self.load_registrations().await?;
        let grants = self.load_grants().await?;
        let (process_gate, score_weights) = self.load_settings().await?;

        {
            let mut snapshot = self.snapshot.write().await;
            *snapshot = MirrorSnapshot {
                members,
                registrations,
                grants,
                process_gate,
                score_weights,
                loaded_at: Some(self.clock.now()),
            };
            info!(
                members = snapshot.members.len(),
                registrations = snapshot.registrations.len(),
                grants = snapshot.grants.len(),
                "mirror reloaded"
            );
        }

        self.process_gate.apply_canonical(process_gate).await;
        Ok(())
    }

    /// Reloads the table a change notification points at.
    pub async fn reload_table(&self, table: StoreTable) -> AppResult<()> {
        match table {
            StoreTable::Users => {
                let members = self.load_members().await?;
                self.snapshot.write().await.members = members;
            }
            StoreTable::Registrations => {
                let registrations = self.load_registrations().await?;
                self.snapshot.write().await.registrations = registrations;
            }
            StoreTable::PermissionGrants => {
                let grants = self.load_grants().await?;
                self.snapshot.write().await.grants = grants;
            }
            StoreTable::SiteSettings => {
                let (process_gate, score_weights) = self.load_settings().await?;
                {
                    let mut snapshot = self.snapshot.write().await;
                    snapshot.process_gate = process_gate;
                    snapshot.score_weights = score_weights;
                }
                self.process_gate.apply_canonical(process_gate).await;
            }
        }

        debug!(table = table.as_str(), "mirror table reloaded");
        Ok(())
    }

    /// Runs the reload loop until `shutdown` resolves.
    ///
    /// A full reload runs on every interval tick (the first one
    /// immediately); change notifications reload their table in between.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) {
        let mut interval = tokio::time::interval(self.reload_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut changes = self.subscribe().await;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown => break,

                _ = interval.tick() => {
                    if changes.is_none() {
                        changes = self.subscribe().await;
                    }
                    if let Err(error) = self.reload_all().await {
                        warn!(error = %error, "mirror full reload failed");
                    }
                }

                change = next_change(&mut changes) => {
                    if !self.apply_change(change).await {
                        changes = None;
                    }
                }
            }
        }

        info!("mirror stopped");
    }

    /// Applies one feed delivery; returns `false` once the feed closed.
    async fn apply_change(&self, change: Result<ChangeNotification, RecvError>) -> bool {
        let outcome = match change {
            Ok(notification) => self.reload_table(notification.table).await,
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "mirror lagged behind the change feed; reloading everything");
                self.reload_all().await
            }
            Err(RecvError::Closed) => {
                warn!("change feed closed; mirror continues on periodic reloads");
                return false;
            }
        };

        if let Err(error) = outcome {
            warn!(error = %error, "mirror reload after change failed");
        }
        true
    }

    async fn subscribe(&self) -> Option<broadcast::Receiver<ChangeNotification>> {
        match self.change_feed.subscribe().await {
            Ok(receiver) => Some(receiver),
            Err(error) => {
                warn!(error = %error, "change feed subscription failed");
                None
            }
        }
    }

    async fn load_members(&self) -> AppResult<HashMap<UserId, Member>> {
        let members = bounded(
            self.store_timeout,
            "list members",
            self.user_repository.list_members(),
        )
        .await?;
        Ok(members
            .into_iter()
            .map(|member| (member.id(), member))
            .collect())
    }

    async fn load_registrations(&self) -> AppResult<HashMap<RegistrationId, Registration>> {
        let registrations = bounded(
            self.store_timeout,
            "list registrations",
            self.registration_repository
                .list_registrations(RegistrationQuery::default()),
        )
        .await?;
        Ok(registrations
            .into_iter()
            .map(|registration| (registration.id, registration))
            .collect())
    }

    async fn load_grants(&self) -> AppResult<Vec<PermissionGrant>> {
        bounded(
            self.store_timeout,
            "list grants",
            self.grant_repository
                .list_grants(GrantQuery::default(), self.clock.now()),
        )
        .await
    }

    async fn load_settings(&self) -> AppResult<(ProcessGateState, ScoreWeights)> {
        let process_gate = bounded(
            self.store_timeout,
            "load process gate",
            self.settings_repository.process_gate(),
        )
        .await?;
        let score_weights = bounded(
            self.store_timeout,
            "load score weights",
            self.settings_repository.score_weights(),
        )
        .await?;
        Ok((process_gate, score_weights))
    }
}

async fn next_change(
    changes: &mut Option<broadcast::Receiver<ChangeNotification>>,
) -> Result<ChangeNotification, RecvError> {
    match changes {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}
