use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use selecta_application::{ChangeFeed, ChangeKind, ChangeNotification, StoreTable};
use selecta_core::{AppError, AppResult};

use crate::postgres_error::store_error;

/// Channel the migration triggers publish on.
pub const CHANGE_CHANNEL: &str = "selecta_changes";

const CHANGE_FEED_CAPACITY: usize = 256;
const LISTENER_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Row-level change feed backed by PostgreSQL `LISTEN/NOTIFY`.
///
/// One listener connection fans out to every subscriber; notifications
/// sent while the connection is being re-established are lost, which the
/// mirror's periodic reload covers.
#[derive(Clone)]
pub struct PostgresChangeFeed {
    sender: broadcast::Sender<ChangeNotification>,
}

#[derive(Debug, Deserialize)]
struct ChangePayload {
    table: String,
    kind: String,
    record_id: Option<String>,
}

impl TryFrom<ChangePayload> for ChangeNotification {
    type Error = AppError;

    fn try_from(payload: ChangePayload) -> Result<Self, Self::Error> {
        Ok(Self {
            table: StoreTable::from_str(&payload.table)?,
            kind: ChangeKind::from_str(&payload.kind)?,
            record_id: payload.record_id,
        })
    }
}

impl PostgresChangeFeed {
    /// Starts listening and forwarding notifications in a background task.
    pub async fn connect(pool: &PgPool) -> AppResult<Self> {
        let mut listener = PgListener::connect_with(pool)
            .await
            .map_err(|error| store_error("failed to open change listener", error))?;
        listener
            .listen(CHANGE_CHANNEL)
            .await
            .map_err(|error| store_error("failed to listen for changes", error))?;

        let (sender, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        tokio::spawn(forward_notifications(listener, sender.clone()));

        Ok(Self { sender })
    }
}

#[async_trait]
impl ChangeFeed for PostgresChangeFeed {
    async fn subscribe(&self) -> AppResult<broadcast::Receiver<ChangeNotification>> {
        Ok(self.sender.subscribe())
    }
}

fn parse_payload(payload: &str) -> AppResult<ChangeNotification> {
    serde_json::from_str::<ChangePayload>(payload)
        .map_err(|error| AppError::Internal(format!("malformed change payload: {error}")))?
        .try_into()
}

async fn forward_notifications(
    mut listener: PgListener,
    sender: broadcast::Sender<ChangeNotification>,
) {
    loop {
        match listener.recv().await {
            Ok(notification) => match parse_payload(notification.payload()) {
                Ok(change) => {
                    debug!(table = change.table.as_str(), "store change received");
                    // Nobody listening yet is fine.
                    let _ = sender.send(change);
                }
                Err(error) => warn!(error = %error, "ignoring change notification"),
            },
            Err(error) => {
                warn!(error = %error, "change listener failed; reconnecting");
                tokio::time::sleep(LISTENER_RETRY_DELAY).await;
            }
        }
    }
}
