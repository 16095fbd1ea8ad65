use thiserror::Error;

/// Library-level error type.
/// Callers map these onto their own transport; the core never retries.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Invalid scoring tables: {0}")]
    InvalidTables(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code for the error variant.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::UnknownUser(_) => "UNKNOWN_USER",
            AppError::InvalidTables(_) => "INVALID_TABLES",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(AppError::InvalidInput("x".into()).code(), "INVALID_INPUT");
        assert_eq!(AppError::UnknownUser("u".into()).code(), "UNKNOWN_USER");
        assert_eq!(AppError::InvalidTables("t".into()).code(), "INVALID_TABLES");
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_display_includes_detail() {
        let err = AppError::UnknownUser("ghost@example.com".into());
        assert_eq!(err.to_string(), "Unknown user: ghost@example.com");
    }
}
