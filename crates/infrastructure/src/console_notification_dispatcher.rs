//! Console notification channel for development. Logs notifications to tracing output.

use async_trait::async_trait;
use selecta_application::NotificationDispatcher;
use selecta_core::AppResult;
use selecta_domain::{Notification, NotificationRecipient};
use tracing::info;

/// Development dispatcher that logs notifications to the console.
#[derive(Clone, Default)]
pub struct ConsoleNotificationDispatcher;

impl ConsoleNotificationDispatcher {
    /// Creates a new console dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationDispatcher for ConsoleNotificationDispatcher {
    async fn dispatch(&self, notification: Notification) -> AppResult<()> {
        let recipient = match &notification.recipient {
            NotificationRecipient::Member { user_id } => format!("member {user_id}"),
            NotificationRecipient::Applicant { email, .. } => format!("applicant <{email}>"),
        };

        info!(
            recipient = %recipient,
            kind = notification.kind.as_str(),
            related_id = notification.related_id.as_deref().unwrap_or("-"),
            "--- NOTIFICATION (console) ---\nTo: {}\nTitle: {}\n\n{}\n--- END NOTIFICATION ---",
            recipient,
            notification.title,
            notification.message
        );

        Ok(())
    }
}
