//! Store error types.

use sea_orm::DbErr;
use thiserror::Error;

/// Failure conditions of the store operations.
///
/// `NotFound` and `Validation` are caller errors; `Database` wraps any
/// transactional failure, after which the pending transaction is rolled
/// back and no partial writes survive.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Display messages ──────────────────────────────────────────────

    #[test]
    fn test_display_not_found() {
        let err = StoreError::NotFound("Venue");
        assert_eq!(err.to_string(), "Venue not found");
    }

    #[test]
    fn test_display_validation() {
        let err = StoreError::Validation("phone must match 123-456-7890".into());
        assert_eq!(
            err.to_string(),
            "validation failed: phone must match 123-456-7890"
        );
    }

    // ── From conversions ──────────────────────────────────────────────

    #[test]
    fn test_from_db_error() {
        let db_err = sea_orm::DbErr::Custom("connection dropped".into());
        let err: StoreError = db_err.into();
        assert!(matches!(err, StoreError::Database(_)));
        assert!(err.to_string().contains("connection dropped"));
    }

    // ── Error trait source chain ──────────────────────────────────────

    #[test]
    fn test_error_source() {
        use std::error::Error;
        let err: StoreError = sea_orm::DbErr::Custom("boom".into()).into();
        assert!(err.source().is_some());
        let err = StoreError::NotFound("Artist");
        assert!(err.source().is_none());
    }
}
