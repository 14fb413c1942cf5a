use selecta_core::AppError;

/// Maps a driver error, treating lost connectivity as recoverable.
pub(crate) fn store_error(context: &str, error: sqlx::Error) -> AppError {
    match error {
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => AppError::Unavailable(format!("{context}: {error}")),
        _ => AppError::Internal(format!("{context}: {error}")),
    }
}

#[cfg(test)]
mod tests {
    use selecta_core::AppError;

    use super::store_error;

    #[test]
    fn pool_exhaustion_is_unavailable() {
        assert!(matches!(
            store_error("load grant", sqlx::Error::PoolTimedOut),
            AppError::Unavailable(message) if message.starts_with("load grant")
        ));
    }

    #[test]
    fn missing_rows_are_internal() {
        assert!(matches!(
            store_error("load grant", sqlx::Error::RowNotFound),
            AppError::Internal(_)
        ));
    }
}
