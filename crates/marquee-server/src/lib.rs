pub mod api;
pub mod error;
pub mod forms;

use axum::{
    http::{HeaderValue, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use marquee_db::AppState;
use serde::Serialize;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[derive(Serialize)]
struct ApiStatus {
    name: &'static str,
    status: &'static str,
}

async fn index() -> Json<ApiStatus> {
    Json(ApiStatus {
        name: "marquee",
        status: "ok",
    })
}

async fn healthz() -> Json<ApiStatus> {
    Json(ApiStatus {
        name: "marquee",
        status: "ok",
    })
}

/// Fallback for unmatched paths.
async fn page_not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "Page not found".to_string())
}

/// Build the application router.
pub fn app(state: Arc<AppState>) -> Router {
    // CORS configuration — restrict to configured origins
    let cors = {
        let allowed_origins_str = std::env::var("CORS_ORIGINS").unwrap_or_default();
        if allowed_origins_str.is_empty() {
            CorsLayer::new()
        } else {
            let origins: Vec<HeaderValue> = allowed_origins_str
                .split(',')
                .filter_map(|s| HeaderValue::from_str(s.trim()).ok())
                .collect();
            tracing::info!("CORS allowed origins: {:?}", origins);
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers(Any)
        }
    };

    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        // Venues
        .route("/venues", get(api::venues::list_venues))
        .route("/venues/search", post(api::venues::search_venues))
        .route(
            "/venues/create",
            get(api::venues::create_venue_form).post(api::venues::create_venue),
        )
        .route(
            "/venues/{venue_id}",
            get(api::venues::show_venue).delete(api::venues::delete_venue),
        )
        .route(
            "/venues/{venue_id}/edit",
            get(api::venues::edit_venue_form).post(api::venues::edit_venue),
        )
        .route(
            "/venues/{venue_id}/delete",
            post(api::venues::delete_venue_submission),
        )
        // Artists
        .route("/artists", get(api::artists::list_artists))
        .route("/artists/search", post(api::artists::search_artists))
        .route(
            "/artists/create",
            get(api::artists::create_artist_form).post(api::artists::create_artist),
        )
        .route(
            "/artists/{artist_id}",
            get(api::artists::show_artist).delete(api::artists::delete_artist),
        )
        .route(
            "/artists/{artist_id}/edit",
            get(api::artists::edit_artist_form).post(api::artists::edit_artist),
        )
        .route(
            "/artists/{artist_id}/delete",
            post(api::artists::delete_artist_submission),
        )
        // Shows
        .route("/shows", get(api::shows::list_shows))
        .route(
            "/shows/create",
            get(api::shows::create_show_form).post(api::shows::create_show),
        )
        .fallback(page_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
