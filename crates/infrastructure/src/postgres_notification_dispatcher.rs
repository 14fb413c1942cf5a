use async_trait::async_trait;
use sqlx::PgPool;

use selecta_application::NotificationDispatcher;
use selecta_core::AppResult;
use selecta_domain::{Notification, NotificationRecipient};

use crate::postgres_error::store_error;

/// Writes notifications to the `notifications` inbox table.
#[derive(Clone)]
pub struct PostgresNotificationDispatcher {
    pool: PgPool,
}

impl PostgresNotificationDispatcher {
    /// Creates a dispatcher with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationDispatcher for PostgresNotificationDispatcher {
    async fn dispatch(&self, notification: Notification) -> AppResult<()> {
        let (user_id, registration_id, recipient_email) = match notification.recipient {
            NotificationRecipient::Member { user_id } => (Some(user_id.as_uuid()), None, None),
            NotificationRecipient::Applicant {
                registration_id,
                email,
            } => (None, Some(registration_id.as_uuid()), Some(email)),
        };

        sqlx::query(
            r#"
            INSERT INTO notifications (
                user_id,
                registration_id,
                recipient_email,
                title,
                message,
                kind,
                related_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user_id)
        .bind(registration_id)
        .bind(recipient_email)
        .bind(notification.title)
        .bind(notification.message)
        .bind(notification.kind.as_str())
        .bind(notification.related_id)
        .execute(&self.pool)
        .await
        .map_err(|error| store_error("failed to store notification", error))?;

        Ok(())
    }
}
