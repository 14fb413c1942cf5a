use async_trait::async_trait;
use selecta_core::AppResult;
use selecta_domain::Notification;

/// Outbound notification channel.
///
/// Callers treat dispatch as best-effort: a failure is logged, never
/// propagated to the operation that triggered it.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Hands one notification to the channel.
    async fn dispatch(&self, notification: Notification) -> AppResult<()>;
}
