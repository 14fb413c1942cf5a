use std::str::FromStr;

use async_trait::async_trait;
use selecta_core::{AppError, AppResult};
use tokio::sync::broadcast;

/// Tables observed by the change feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreTable {
    /// Member accounts.
    Users,
    /// Applicant registrations.
    Registrations,
    /// Permission grants.
    PermissionGrants,
    /// Site settings singleton.
    SiteSettings,
}

impl StoreTable {
    /// Returns the stable table name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Registrations => "registrations",
            Self::PermissionGrants => "permission_grants",
            Self::SiteSettings => "site_settings",
        }
    }
}

impl FromStr for StoreTable {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "users" => Ok(Self::Users),
            "registrations" => Ok(Self::Registrations),
            "permission_grants" => Ok(Self::PermissionGrants),
            "site_settings" => Ok(Self::SiteSettings),
            _ => Err(AppError::Validation(format!("unknown store table '{value}'"))),
        }
    }
}

/// Row-level change kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Row inserted.
    Insert,
    /// Row updated.
    Update,
    /// Row deleted.
    Delete,
}

impl FromStr for ChangeKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "insert" => Ok(Self::Insert),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(AppError::Validation(format!("unknown change kind '{value}'"))),
        }
    }
}

/// One row-level change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotification {
    /// Changed table.
    pub table: StoreTable,
    /// Change kind.
    pub kind: ChangeKind,
    /// Changed row id, when the store reports it.
    pub record_id: Option<String>,
}

/// Subscription source for row-level change notifications.
///
/// Delivery may drop or repeat notifications; consumers reload state
/// rather than apply deltas.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Opens a new subscription.
    async fn subscribe(&self) -> AppResult<broadcast::Receiver<ChangeNotification>>;
}
