use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::{format_start_time, like_pattern, split_past_upcoming, Flash, SearchForm, SearchResults};
use crate::error::{db_error, flash_error, not_found, ApiError};
use crate::forms::{form_choices, FormChoices, VenueForm};
use marquee_db::entities::{artist, genre, show, venue};
use marquee_db::{ops, AppState, StoreError};

#[derive(Debug, Serialize)]
pub struct VenueListItem {
    pub id: Uuid,
    pub name: String,
    pub num_upcoming_shows: u64,
}

/// One (city, state) group in the venues listing.
#[derive(Debug, Serialize)]
pub struct Area {
    pub city: String,
    pub state: String,
    pub venues: Vec<VenueListItem>,
}

/// A show on the venue detail page, annotated with its artist.
#[derive(Debug, Serialize)]
pub struct VenueShowEntry {
    pub artist_id: Uuid,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
}

#[derive(Debug, Serialize)]
pub struct VenueDetail {
    pub id: Uuid,
    pub name: String,
    pub genres: Vec<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    pub past_shows: Vec<VenueShowEntry>,
    pub upcoming_shows: Vec<VenueShowEntry>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

/// Current field values of a venue, in the shape the edit form posts
/// back.
#[derive(Debug, Serialize)]
pub struct VenueFormData {
    pub name: String,
    pub genres: Vec<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website_link: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedVenue {
    pub name: String,
}

/// Group venues into areas by first-seen (city, state) pair.
pub(crate) fn group_by_area(rows: Vec<(venue::Model, u64)>) -> Vec<Area> {
    let mut areas: Vec<Area> = Vec::new();
    for (venue, num_upcoming_shows) in rows {
        let item = VenueListItem {
            id: venue.id,
            name: venue.name,
            num_upcoming_shows,
        };
        match areas
            .iter_mut()
            .find(|a| a.city == venue.city && a.state == venue.state)
        {
            Some(area) => area.venues.push(item),
            None => areas.push(Area {
                city: venue.city,
                state: venue.state,
                venues: vec![item],
            }),
        }
    }
    areas
}

fn show_entries(
    shows: Vec<show::Model>,
    artists_by_id: &HashMap<Uuid, artist::Model>,
) -> Vec<VenueShowEntry> {
    shows
        .into_iter()
        .filter_map(|s| {
            let artist = s.artist_id.and_then(|id| artists_by_id.get(&id))?;
            Some(VenueShowEntry {
                artist_id: artist.id,
                artist_name: artist.name.clone(),
                artist_image_link: artist.image_link.clone(),
                start_time: format_start_time(s.start_time),
            })
        })
        .collect()
}

/// GET /venues
pub async fn list_venues(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Area>>, ApiError> {
    let now = Utc::now().fixed_offset();

    let venues = venue::Entity::find().all(&state.db).await.map_err(db_error)?;

    let mut rows = Vec::with_capacity(venues.len());
    for venue in venues {
        let count = ops::upcoming_shows_for_venue(&state.db, venue.id, now)
            .await
            .map_err(db_error)?;
        rows.push((venue, count));
    }

    Ok(Json(group_by_area(rows)))
}

/// POST /venues/search
pub async fn search_venues(
    State(state): State<Arc<AppState>>,
    Json(form): Json<SearchForm>,
) -> Result<Json<SearchResults<VenueListItem>>, ApiError> {
    let now = Utc::now().fixed_offset();
    let pattern = like_pattern(&form.search_term);

    let matches = venue::Entity::find()
        .filter(Expr::col((venue::Entity, venue::Column::Name)).ilike(pattern.as_str()))
        .all(&state.db)
        .await
        .map_err(db_error)?;

    let mut data = Vec::with_capacity(matches.len());
    for venue in matches {
        let count = ops::upcoming_shows_for_venue(&state.db, venue.id, now)
            .await
            .map_err(db_error)?;
        data.push(VenueListItem {
            id: venue.id,
            name: venue.name,
            num_upcoming_shows: count,
        });
    }

    Ok(Json(SearchResults {
        count: data.len(),
        data,
    }))
}

/// GET /venues/:id
pub async fn show_venue(
    State(state): State<Arc<AppState>>,
    Path(venue_id): Path<Uuid>,
) -> Result<Json<VenueDetail>, ApiError> {
    let now = Utc::now().fixed_offset();

    let venue = venue::Entity::find_by_id(venue_id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("Venue"))?;

    let genres = venue
        .find_related(genre::Entity)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    let shows = show::Entity::find()
        .filter(show::Column::VenueId.eq(venue_id))
        .order_by_asc(show::Column::StartTime)
        .all(&state.db)
        .await
        .map_err(db_error)?;

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
    let artists_by_id: HashMap<Uuid, artist::Model> =
        artists.into_iter().map(|a| (a.id, a)).collect();

    let (past, upcoming) = split_past_upcoming(shows, now);
    let past_shows = show_entries(past, &artists_by_id);
    let upcoming_shows = show_entries(upcoming, &artists_by_id);

    Ok(Json(VenueDetail {
        id: venue.id,
        name: venue.name,
        genres: genres.into_iter().map(|g| g.name).collect(),
        address: venue.address,
        city: venue.city,
        state: venue.state,
        phone: venue.phone,
        website: venue.website_link,
        facebook_link: venue.facebook_link,
        seeking_talent: venue.seeking_talent,
        seeking_description: venue.seeking_description,
        image_link: venue.image_link,
        past_shows_count: past_shows.len(),
        upcoming_shows_count: upcoming_shows.len(),
        past_shows,
        upcoming_shows,
    }))
}

/// GET /venues/create
pub async fn create_venue_form() -> Json<FormChoices> {
    Json(form_choices())
}

/// POST /venues/create
pub async fn create_venue(
    State(state): State<Arc<AppState>>,
    Json(form): Json<VenueForm>,
) -> Result<(StatusCode, Json<Flash>), ApiError> {
    let fail = format!("An error occurred. Venue {} could not be listed.", form.name);

    if let Err(reason) = form.validate() {
        return Err(flash_error(StoreError::Validation(reason), &fail));
    }

    let now = Utc::now().fixed_offset();
    let txn = state
        .db
        .begin()
        .await
        .map_err(|e| flash_error(StoreError::Database(e), &fail))?;

    let venue = venue::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(form.name.clone()),
        address: Set(form.address),
        city: Set(form.city),
        state: Set(form.state),
        phone: Set(form.phone),
        website_link: Set(form.website_link),
        facebook_link: Set(form.facebook_link),
        seeking_talent: Set(form.seeking_talent),
        seeking_description: Set(form.seeking_description),
        image_link: Set(form.image_link),
        created_at: Set(now),
    }
    .insert(&txn)
    .await
    .map_err(|e| flash_error(StoreError::Database(e), &fail))?;

    ops::replace_venue_genres(&txn, venue.id, &form.genres)
        .await
        .map_err(|e| flash_error(e, &fail))?;

    txn.commit()
        .await
        .map_err(|e| flash_error(StoreError::Database(e), &fail))?;

    Ok((
        StatusCode::CREATED,
        Json(Flash::new(format!(
            "Venue {} was successfully listed!",
            venue.name
        ))),
    ))
}

/// GET /venues/:id/edit
pub async fn edit_venue_form(
    State(state): State<Arc<AppState>>,
    Path(venue_id): Path<Uuid>,
) -> Result<Json<VenueFormData>, ApiError> {
    let venue = venue::Entity::find_by_id(venue_id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("Venue"))?;

    let genres = venue
        .find_related(genre::Entity)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    Ok(Json(VenueFormData {
        name: venue.name,
        genres: genres.into_iter().map(|g| g.name).collect(),
        address: venue.address,
        city: venue.city,
        state: venue.state,
        phone: venue.phone,
        website_link: venue.website_link,
        facebook_link: venue.facebook_link,
        seeking_talent: venue.seeking_talent,
        seeking_description: venue.seeking_description,
        image_link: venue.image_link,
    }))
}

/// POST /venues/:id/edit
///
/// Full replace of the scalar fields and of the genre set.
pub async fn edit_venue(
    State(state): State<Arc<AppState>>,
    Path(venue_id): Path<Uuid>,
    Json(form): Json<VenueForm>,
) -> Result<Json<Flash>, ApiError> {
    let fail = format!(
        "An error occurred. Venue {} could not be updated.",
        form.name
    );

    if let Err(reason) = form.validate() {
        return Err(flash_error(StoreError::Validation(reason), &fail));
    }

    let txn = state
        .db
        .begin()
        .await
        .map_err(|e| flash_error(StoreError::Database(e), &fail))?;

    let existing = venue::Entity::find_by_id(venue_id)
        .one(&txn)
        .await
        .map_err(|e| flash_error(StoreError::Database(e), &fail))?
        .ok_or_else(|| not_found("Venue"))?;

    let mut active: venue::ActiveModel = existing.into();
    active.name = Set(form.name.clone());
    active.address = Set(form.address);
    active.city = Set(form.city);
    active.state = Set(form.state);
    active.phone = Set(form.phone);
    active.website_link = Set(form.website_link);
    active.facebook_link = Set(form.facebook_link);
    active.seeking_talent = Set(form.seeking_talent);
    active.seeking_description = Set(form.seeking_description);
    active.image_link = Set(form.image_link);

    let venue = active
        .update(&txn)
        .await
        .map_err(|e| flash_error(StoreError::Database(e), &fail))?;

    ops::replace_venue_genres(&txn, venue.id, &form.genres)
        .await
        .map_err(|e| flash_error(e, &fail))?;

    txn.commit()
        .await
        .map_err(|e| flash_error(StoreError::Database(e), &fail))?;

    Ok(Json(Flash::new(format!(
        "Venue {} was successfully updated!",
        venue.name
    ))))
}

/// Delete a venue and, via the relationship cascade, its shows and
/// genre links. The orphan sweep runs in the same transaction.
async fn delete_venue_by_id(
    db: &DatabaseConnection,
    venue_id: Uuid,
) -> Result<String, StoreError> {
    let txn = db.begin().await?;

    let venue = venue::Entity::find_by_id(venue_id)
        .one(&txn)
        .await?
        .ok_or(StoreError::NotFound("Venue"))?;
    let name = venue.name;

    venue::Entity::delete_by_id(venue_id).exec(&txn).await?;
    ops::cleanup_orphan_shows(&txn).await?;

    txn.commit().await?;
    Ok(name)
}

/// DELETE /venues/:id
pub async fn delete_venue(
    State(state): State<Arc<AppState>>,
    Path(venue_id): Path<Uuid>,
) -> Result<Json<DeletedVenue>, ApiError> {
    let name = delete_venue_by_id(&state.db, venue_id)
        .await
        .map_err(|e| {
            flash_error(e, "An error occurred. The selected venue could not be deleted.")
        })?;
    Ok(Json(DeletedVenue { name }))
}

/// POST /venues/:id/delete
pub async fn delete_venue_submission(
    State(state): State<Arc<AppState>>,
    Path(venue_id): Path<Uuid>,
) -> Result<Json<Flash>, ApiError> {
    let name = delete_venue_by_id(&state.db, venue_id)
        .await
        .map_err(|e| {
            flash_error(e, "An error occurred. The selected venue could not be deleted.")
        })?;
    Ok(Json(Flash::new(format!(
        "Venue {name} was successfully deleted."
    ))))
}
