use sea_orm::error::DbErr;
use serde::Serialize;

/// Crate-wide service error.
///
/// Validation and not-found failures are raised before any row is written;
/// everything detected mid-operation aborts the surrounding transaction, so a
/// returned error always means the store is unchanged by the failed call.
#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(
        #[from]
        #[serde(skip)]
        DbErr,
    ),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Wraps a storage failure, preserving the original cause for diagnostics.
    pub fn db_error(error: DbErr) -> Self {
        ServiceError::Database(error)
    }

    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        ServiceError::NotFound(format!("{} {} not found", entity, id))
    }

    /// Stable machine-readable kind, independent of the message text.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Database(_) => "database_error",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Validation(_) => "validation_error",
            ServiceError::InsufficientBalance(_) => "insufficient_balance",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::InvalidTransition(_) => "invalid_transition",
            ServiceError::Internal(_) => "internal_error",
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::Validation(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_stable_across_messages() {
        let a = ServiceError::InsufficientBalance("credit 1".into());
        let b = ServiceError::InsufficientBalance("credit 2".into());
        assert_eq!(a.kind(), b.kind());
        assert_eq!(a.kind(), "insufficient_balance");
    }

    #[test]
    fn not_found_helper_names_the_entity() {
        let err = ServiceError::not_found("Credit", "42");
        assert_eq!(err.to_string(), "Not found: Credit 42 not found");
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn db_errors_preserve_the_cause() {
        let err: ServiceError = DbErr::Custom("connection reset".into()).into();
        assert!(err.to_string().contains("connection reset"));
    }
}
