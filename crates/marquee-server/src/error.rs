//! Mapping from store failures to HTTP responses.
//!
//! Not-found conditions become 404s; rejected form input becomes a 400
//! carrying the flash message for the attempted action; transactional
//! failures are logged server-side and surface only as the generic
//! flash text, never the underlying error.

use axum::http::StatusCode;
use marquee_db::StoreError;
use sea_orm::DbErr;

pub type ApiError = (StatusCode, String);

pub fn not_found(what: &str) -> ApiError {
    (StatusCode::NOT_FOUND, format!("{what} not found"))
}

/// For read paths with no flash context.
pub fn db_error(err: DbErr) -> ApiError {
    tracing::error!(error = %err, "database operation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "A database error occurred.".to_string(),
    )
}

/// For write paths: pair the failure with the action's flash message.
pub fn flash_error(err: StoreError, flash: &str) -> ApiError {
    match err {
        StoreError::NotFound(what) => not_found(what),
        StoreError::Validation(reason) => {
            tracing::warn!(%reason, "rejected form submission");
            (StatusCode::BAD_REQUEST, flash.to_string())
        }
        StoreError::Database(e) => {
            tracing::error!(error = %e, "transaction failed, rolling back");
            (StatusCode::INTERNAL_SERVER_ERROR, flash.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLASH: &str = "An error occurred. Venue Park Square could not be listed.";

    #[test]
    fn test_not_found_maps_to_404() {
        let (status, body) = flash_error(StoreError::NotFound("Venue"), FLASH);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Venue not found");
    }

    #[test]
    fn test_validation_maps_to_400_with_flash() {
        let err = StoreError::Validation("phone is malformed".into());
        let (status, body) = flash_error(err, FLASH);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, FLASH);
    }

    #[test]
    fn test_database_failure_surfaces_only_the_flash() {
        let err = StoreError::Database(DbErr::Custom("deadlock detected".into()));
        let (status, body) = flash_error(err, FLASH);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, FLASH);
        assert!(!body.contains("deadlock"));
    }

    #[test]
    fn test_db_error_never_leaks_the_cause() {
        let (status, body) = db_error(DbErr::Custom("password=hunter2".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("hunter2"));
    }
}
