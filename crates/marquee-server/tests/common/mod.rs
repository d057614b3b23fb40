// Shared test utilities for integration tests
use marquee_db::AppState;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Create a test AppState around a mock database connection
pub fn test_app_state(db: DatabaseConnection) -> Arc<AppState> {
    Arc::new(AppState { db })
}
