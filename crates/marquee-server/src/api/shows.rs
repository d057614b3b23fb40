use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::{format_start_time, Flash};
use crate::error::{db_error, flash_error, not_found, ApiError};
use crate::forms::ShowForm;
use marquee_db::entities::{artist, show, venue};
use marquee_db::{ops, AppState, StoreError};

#[derive(Debug, Serialize)]
pub struct ShowListItem {
    pub venue_id: Uuid,
    pub venue_name: String,
    pub artist_id: Uuid,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
}

/// Defaults for the booking form.
#[derive(Debug, Serialize)]
pub struct ShowFormDefaults {
    pub start_time: DateTime<FixedOffset>,
}

/// Annotate shows with their venue and artist, preserving order.
///
/// Rows whose parents cannot be resolved are skipped; the orphan sweep
/// keeps such rows out of committed state in the first place.
pub(crate) fn assemble_show_listing(
    shows: Vec<show::Model>,
    venues_by_id: &HashMap<Uuid, venue::Model>,
    artists_by_id: &HashMap<Uuid, artist::Model>,
) -> Vec<ShowListItem> {
    shows
        .into_iter()
        .filter_map(|s| {
            let venue = s.venue_id.and_then(|id| venues_by_id.get(&id))?;
            let artist = s.artist_id.and_then(|id| artists_by_id.get(&id))?;
            Some(ShowListItem {
                venue_id: venue.id,
                venue_name: venue.name.clone(),
                artist_id: artist.id,
                artist_name: artist.name.clone(),
                artist_image_link: artist.image_link.clone(),
                start_time: format_start_time(s.start_time),
            })
        })
        .collect()
}

/// GET /shows
pub async fn list_shows(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ShowListItem>>, ApiError> {
    let shows = show::Entity::find()
        .order_by_desc(show::Column::StartTime)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    let venue_ids: Vec<Uuid> = shows.iter().filter_map(|s| s.venue_id).collect();
    let venues = if venue_ids.is_empty() {
        vec![]
    } else {
        venue::Entity::find()
            .filter(venue::Column::Id.is_in(venue_ids))
            .all(&state.db)
            .await
            .map_err(db_error)?
    };

    let artist_ids: Vec<Uuid> = shows.iter().filter_map(|s| s.artist_id).collect();
    let artists = if artist_ids.is_empty() {
        vec![]
    } else {
        artist::Entity::find()
            .filter(artist::Column::Id.is_in(artist_ids))
            .all(&state.db)
            .await
            .map_err(db_error)?
    };

    let venues_by_id: HashMap<Uuid, venue::Model> =
        venues.into_iter().map(|v| (v.id, v)).collect();
    let artists_by_id: HashMap<Uuid, artist::Model> =
        artists.into_iter().map(|a| (a.id, a)).collect();

    Ok(Json(assemble_show_listing(
        shows,
        &venues_by_id,
        &artists_by_id,
    )))
}

/// GET /shows/create
pub async fn create_show_form() -> Json<ShowFormDefaults> {
    Json(ShowFormDefaults {
        start_time: Utc::now().fixed_offset(),
    })
}

/// POST /shows/create
///
/// Both parents must exist; the orphan sweep runs in the same
/// transaction as the insert.
pub async fn create_show(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ShowForm>,
) -> Result<(StatusCode, Json<Flash>), ApiError> {
    const FAIL: &str = "An error occurred. Show could not be listed.";

    let now = Utc::now().fixed_offset();
    let txn = state
        .db
        .begin()
        .await
        .map_err(|e| flash_error(StoreError::Database(e), FAIL))?;

    venue::Entity::find_by_id(form.venue_id)
        .one(&txn)
        .await
        .map_err(|e| flash_error(StoreError::Database(e), FAIL))?
        .ok_or_else(|| not_found("Venue"))?;

    artist::Entity::find_by_id(form.artist_id)
        .one(&txn)
        .await
        .map_err(|e| flash_error(StoreError::Database(e), FAIL))?
        .ok_or_else(|| not_found("Artist"))?;

    show::ActiveModel {
        id: Set(Uuid::new_v4()),
        venue_id: Set(Some(form.venue_id)),
        artist_id: Set(Some(form.artist_id)),
        start_time: Set(form.start_time),
        created_at: Set(now),
    }
    .insert(&txn)
    .await
    .map_err(|e| flash_error(StoreError::Database(e), FAIL))?;

    ops::cleanup_orphan_shows(&txn)
        .await
        .map_err(|e| flash_error(e, FAIL))?;

    txn.commit()
        .await
        .map_err(|e| flash_error(StoreError::Database(e), FAIL))?;

    Ok((
        StatusCode::CREATED,
        Json(Flash::new("Show was successfully listed!")),
    ))
}
