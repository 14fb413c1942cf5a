use std::sync::Arc;
use std::time::Duration;

use selecta_core::AppResult;
use selecta_domain::{Actor, AuditAction, ProcessGateState};
use tokio::sync::{RwLock, broadcast};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::AuthorizationService;
use crate::best_effort::record_audit_event;
use crate::clock::Clock;
use crate::selection_ports::{AuditEvent, AuditRepository, SettingsRepository};
use crate::store_timeout::bounded;

const GATE_EVENT_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy)]
struct GateCacheEntry {
    state: ProcessGateState,
    refreshed_at: Option<Instant>,
}

struct ProcessGateInner {
    authorization_service: AuthorizationService,
    settings_repository: Arc<dyn SettingsRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
    staleness: Duration,
    cache: RwLock<GateCacheEntry>,
    events: broadcast::Sender<ProcessGateState>,
}

/// Read-through cache over the canonical open/closed flag.
///
/// Reads serve the cached value while it is younger than the staleness
/// bound, refresh it otherwise, and fall back to it when the store cannot
/// be reached. Whenever a refresh or write changes the flag, subscribers
/// receive the new state.
#[derive(Clone)]
pub struct ProcessGate {
    inner: Arc<ProcessGateInner>,
}

impl ProcessGate {
    /// Creates a gate with a cold cache that reads as closed.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        settings_repository: Arc<dyn SettingsRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        clock: Arc<dyn Clock>,
        store_timeout: Duration,
        staleness: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(GATE_EVENT_CAPACITY);
        Self {
            inner: Arc::new(ProcessGateInner {
                authorization_service,
                settings_repository,
                audit_repository,
                clock,
                store_timeout,
                staleness,
                cache: RwLock::new(GateCacheEntry {
                    state: ProcessGateState::default(),
                    refreshed_at: None,
                }),
                events,
            }),
        }
    }

    /// Opens the selection process.
    pub async fn open(&self, actor: &Actor) -> AppResult<ProcessGateState> {
        self.inner.authorization_service.require_process_manager(actor)?;
        self.write(actor, true).await
    }

    /// Closes the selection process.
    pub async fn close(&self, actor: &Actor) -> AppResult<ProcessGateState> {
        self.inner.authorization_service.require_process_manager(actor)?;
        self.write(actor, false).await
    }

    /// Flips the canonical flag and returns the new value.
    pub async fn toggle(&self, actor: &Actor) -> AppResult<bool> {
        self.inner.authorization_service.require_process_manager(actor)?;

        let current = bounded(
            self.inner.store_timeout,
            "load process gate",
            self.inner.settings_repository.process_gate(),
        )
        .await?;

        Ok(self.write(actor, !current.is_open).await?.is_open)
    }

    /// Returns whether the selection process is open.
    ///
    /// Never fails: a store failure serves the last known value.
    pub async fn is_open(&self) -> bool {
        let cached = *self.inner.cache.read().await;
        if cached
            .refreshed_at
            .is_some_and(|refreshed_at| refreshed_at.elapsed() < self.inner.staleness)
        {
            return cached.state.is_open;
        }

        match self.refresh().await {
            Ok(state) => state.is_open,
            Err(error) => {
                warn!(
                    error = %error,
                    cached_open = cached.state.is_open,
                    "process gate refresh failed; serving cached value"
                );
                cached.state.is_open
            }
        }
    }

    /// Reloads the canonical value into the cache.
    pub async fn refresh(&self) -> AppResult<ProcessGateState> {
        let state = bounded(
            self.inner.store_timeout,
            "load process gate",
            self.inner.settings_repository.process_gate(),
        )
        .await?;

        self.apply_canonical(state).await;
        Ok(state)
    }

    /// Replaces the cached value with a canonical one.
    ///
    /// A state stamped earlier than the cached one is ignored. Returns
    /// whether the open/closed flag changed; subscribers are notified only
    /// then.
    pub async fn apply_canonical(&self, state: ProcessGateState) -> bool {
        let mut cache = self.inner.cache.write().await;
        if state.updated_at < cache.state.updated_at {
            debug!(
                cached_at = ?cache.state.updated_at,
                received_at = ?state.updated_at,
                "ignoring out-of-order process gate state"
            );
            cache.refreshed_at = Some(Instant::now());
            return false;
        }

        let changed = cache.state.is_open != state.is_open;
        *cache = GateCacheEntry {
            state,
            refreshed_at: Some(Instant::now()),
        };
        drop(cache);

        if changed {
            // No receivers is not an error.
            let _ = self.inner.events.send(state);
        }

        changed
    }

    /// Returns the cached value without touching the store.
    pub async fn cached(&self) -> ProcessGateState {
        self.inner.cache.read().await.state
    }

    /// Subscribes to open/closed changes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ProcessGateState> {
        self.inner.events.subscribe()
    }

    async fn write(&self, actor: &Actor, is_open: bool) -> AppResult<ProcessGateState> {
        let state = ProcessGateState::written(is_open, actor.id(), self.inner.clock.now());
        bounded(
            self.inner.store_timeout,
            "save process gate",
            self.inner.settings_repository.save_process_gate(state),
        )
        .await?;

        self.apply_canonical(state).await;
        info!(actor = %actor.id(), is_open, "process gate updated");

        record_audit_event(
            self.inner.audit_repository.as_ref(),
            self.inner.store_timeout,
            AuditEvent {
                subject: actor.id().to_string(),
                action: AuditAction::ProcessGateToggled,
                resource_type: "site_settings".to_owned(),
                resource_id: "selection_process_open".to_owned(),
                detail: Some(if is_open { "opened" } else { "closed" }.to_owned()),
            },
        )
        .await;

        Ok(state)
    }
}
