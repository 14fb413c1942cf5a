use std::future::Future;
use std::time::Duration;

use selecta_core::{AppError, AppResult};

/// Runs one persistence call under the configured timeout.
///
/// Expiry surfaces as [`AppError::Unavailable`].
pub(crate) async fn bounded<T>(
    timeout: Duration,
    operation: &str,
    call: impl Future<Output = AppResult<T>>,
) -> AppResult<T> {
    tokio::time::timeout(timeout, call).await.map_err(|_| {
        AppError::Unavailable(format!(
            "{operation} timed out after {} ms",
            timeout.as_millis()
        ))
    })?
}
