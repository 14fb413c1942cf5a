use std::time::Duration;

use selecta_domain::Notification;
use tracing::warn;

use crate::selection_ports::{AuditEvent, AuditRepository, NotificationDispatcher};
use crate::store_timeout::bounded;

/// Dispatches a notification, logging and swallowing any failure.
pub(crate) async fn dispatch_notification(
    dispatcher: &dyn NotificationDispatcher,
    timeout: Duration,
    notification: Notification,
) {
    let title = notification.title.clone();
    if let Err(error) = bounded(
        timeout,
        "dispatch notification",
        dispatcher.dispatch(notification),
    )
    .await
    {
        warn!(title = %title, error = %error, "notification dispatch failed");
    }
}

/// Appends an audit event for a change that is already committed.
///
/// A failure is logged; the committed change stands.
pub(crate) async fn record_audit_event(
    audit_repository: &dyn AuditRepository,
    timeout: Duration,
    event: AuditEvent,
) {
    let action = event.action;
    let resource_id = event.resource_id.clone();
    if let Err(error) = bounded(
        timeout,
        "append audit event",
        audit_repository.append_event(event),
    )
    .await
    {
        warn!(
            action = action.as_str(),
            resource_id = %resource_id,
            error = %error,
            "audit event was not recorded"
        );
    }
}
