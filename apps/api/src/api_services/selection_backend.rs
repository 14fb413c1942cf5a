use std::sync::Arc;

use selecta_application::{ChangeFeed, SelectionPorts};
use selecta_core::AppError;
use selecta_domain::{Member, Role, UserId};
use selecta_infrastructure::{
    ConsoleNotificationDispatcher, InMemorySelectionStore, PostgresAuditRepository,
    PostgresChangeFeed, PostgresGrantRepository, PostgresNotificationDispatcher,
    PostgresRegistrationRepository, PostgresSettingsRepository, PostgresUserRepository,
};
use tracing::{info, warn};

use super::connect_and_migrate;
use crate::api_config::ApiConfig;

/// Store adapters plus the feed the sync mirror listens on.
pub struct SelectionBackend {
    pub ports: SelectionPorts,
    pub change_feed: Arc<dyn ChangeFeed>,
}

pub async fn build_selection_backend(config: &ApiConfig) -> Result<SelectionBackend, AppError> {
    match config.database_url.as_deref() {
        Some(database_url) => build_postgres_backend(database_url).await,
        None => {
            warn!("DATABASE_URL is not set; selection data lives in memory only");
            build_in_memory_backend(config.bootstrap_superadmin_id).await
        }
    }
}

async fn build_postgres_backend(database_url: &str) -> Result<SelectionBackend, AppError> {
    let pool = connect_and_migrate(database_url).await?;
    let change_feed = PostgresChangeFeed::connect(&pool).await?;

    Ok(SelectionBackend {
        ports: SelectionPorts {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            grants: Arc::new(PostgresGrantRepository::new(pool.clone())),
            registrations: Arc::new(PostgresRegistrationRepository::new(pool.clone())),
            settings: Arc::new(PostgresSettingsRepository::new(pool.clone())),
            notifications: Arc::new(PostgresNotificationDispatcher::new(pool.clone())),
            audit: Arc::new(PostgresAuditRepository::new(pool)),
        },
        change_feed: Arc::new(change_feed),
    })
}

async fn build_in_memory_backend(
    bootstrap_superadmin_id: Option<UserId>,
) -> Result<SelectionBackend, AppError> {
    let store = Arc::new(InMemorySelectionStore::new());

    if let Some(user_id) = bootstrap_superadmin_id {
        let member = Member::new(
            user_id,
            "Bootstrap Superadmin",
            "superadmin@localhost.localdomain",
            Role::Superadmin,
            true,
        )?;
        store.upsert_member(member).await;
        info!(user_id = %user_id, "seeded bootstrap superadmin");
    }

    Ok(SelectionBackend {
        ports: SelectionPorts {
            users: store.clone(),
            grants: store.clone(),
            registrations: store.clone(),
            settings: store.clone(),
            notifications: Arc::new(ConsoleNotificationDispatcher::new()),
            audit: store.clone(),
        },
        change_feed: store,
    })
}
