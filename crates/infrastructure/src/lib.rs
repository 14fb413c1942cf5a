//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod console_notification_dispatcher;
mod in_memory_selection_store;
mod postgres_audit_repository;
mod postgres_change_feed;
mod postgres_error;
mod postgres_grant_repository;
mod postgres_notification_dispatcher;
mod postgres_registration_repository;
mod postgres_settings_repository;
mod postgres_user_repository;

pub use console_notification_dispatcher::ConsoleNotificationDispatcher;
pub use in_memory_selection_store::InMemorySelectionStore;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_change_feed::{CHANGE_CHANNEL, PostgresChangeFeed};
pub use postgres_grant_repository::PostgresGrantRepository;
pub use postgres_notification_dispatcher::PostgresNotificationDispatcher;
pub use postgres_registration_repository::PostgresRegistrationRepository;
pub use postgres_settings_repository::PostgresSettingsRepository;
pub use postgres_user_repository::PostgresUserRepository;
