//! Persistence and dispatch collaborators consumed by the selection services.

use std::sync::Arc;

mod audit;
mod changes;
mod grants;
mod notifications;
mod registrations;
mod settings;
mod users;

pub use audit::{AuditEvent, AuditRepository};
pub use changes::{ChangeFeed, ChangeKind, ChangeNotification, StoreTable};
pub use grants::{GrantQuery, GrantRepository, GrantUpsert};
pub use notifications::NotificationDispatcher;
pub use registrations::{RegistrationQuery, RegistrationRepository};
pub use settings::SettingsRepository;
pub use users::UserRepository;

/// Collaborators the selection services are wired with.
#[derive(Clone)]
pub struct SelectionPorts {
    /// Member directory.
    pub users: Arc<dyn UserRepository>,
    /// Interviewer grant store.
    pub grants: Arc<dyn GrantRepository>,
    /// Registration store.
    pub registrations: Arc<dyn RegistrationRepository>,
    /// Site settings singleton.
    pub settings: Arc<dyn SettingsRepository>,
    /// Outbound notification channel.
    pub notifications: Arc<dyn NotificationDispatcher>,
    /// Audit sink.
    pub audit: Arc<dyn AuditRepository>,
}
