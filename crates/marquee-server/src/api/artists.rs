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
use crate::forms::{form_choices, ArtistForm, FormChoices};
use marquee_db::entities::{artist, genre, show, venue};
use marquee_db::{ops, AppState, StoreError};

#[derive(Debug, Serialize)]
pub struct ArtistListItem {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ArtistSearchItem {
    pub id: Uuid,
    pub name: String,
    pub num_upcoming_shows: u64,
}

/// A show on the artist detail page, annotated with its venue.
#[derive(Debug, Serialize)]
pub struct ArtistShowEntry {
    pub venue_id: Uuid,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub start_time: String,
}

#[derive(Debug, Serialize)]
pub struct ArtistDetail {
    pub id: Uuid,
    pub name: String,
    pub genres: Vec<String>,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    pub past_shows: Vec<ArtistShowEntry>,
    pub upcoming_shows: Vec<ArtistShowEntry>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

/// Current field values of an artist, in the shape the edit form posts
/// back.
#[derive(Debug, Serialize)]
pub struct ArtistFormData {
    pub name: String,
    pub genres: Vec<String>,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website_link: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedArtist {
    pub name: String,
}

fn show_entries(
    shows: Vec<show::Model>,
    venues_by_id: &HashMap<Uuid, venue::Model>,
) -> Vec<ArtistShowEntry> {
    shows
        .into_iter()
        .filter_map(|s| {
            let venue = s.venue_id.and_then(|id| venues_by_id.get(&id))?;
            Some(ArtistShowEntry {
                venue_id: venue.id,
                venue_name: venue.name.clone(),
                venue_image_link: venue.image_link.clone(),
                start_time: format_start_time(s.start_time),
            })
        })
        .collect()
}

/// GET /artists
pub async fn list_artists(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ArtistListItem>>, ApiError> {
    let artists = artist::Entity::find()
        .all(&state.db)
        .await
        .map_err(db_error)?;

    Ok(Json(
        artists
            .into_iter()
            .map(|a| ArtistListItem {
                id: a.id,
                name: a.name,
            })
            .collect(),
    ))
}

/// POST /artists/search
pub async fn search_artists(
    State(state): State<Arc<AppState>>,
    Json(form): Json<SearchForm>,
) -> Result<Json<SearchResults<ArtistSearchItem>>, ApiError> {
    let now = Utc::now().fixed_offset();
    let pattern = like_pattern(&form.search_term);

    let matches = artist::Entity::find()
        .filter(Expr::col((artist::Entity, artist::Column::Name)).ilike(pattern.as_str()))
        .all(&state.db)
        .await
        .map_err(db_error)?;

    let mut data = Vec::with_capacity(matches.len());
    for artist in matches {
        let count = ops::upcoming_shows_for_artist(&state.db, artist.id, now)
            .await
            .map_err(db_error)?;
        data.push(ArtistSearchItem {
            id: artist.id,
            name: artist.name,
            num_upcoming_shows: count,
        });
    }

    Ok(Json(SearchResults {
        count: data.len(),
        data,
    }))
}

/// GET /artists/:id
pub async fn show_artist(
    State(state): State<Arc<AppState>>,
    Path(artist_id): Path<Uuid>,
) -> Result<Json<ArtistDetail>, ApiError> {
    let now = Utc::now().fixed_offset();

    let artist = artist::Entity::find_by_id(artist_id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("Artist"))?;

    let genres = artist
        .find_related(genre::Entity)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    let shows = show::Entity::find()
        .filter(show::Column::ArtistId.eq(artist_id))
        .order_by_asc(show::Column::StartTime)
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
    let venues_by_id: HashMap<Uuid, venue::Model> =
        venues.into_iter().map(|v| (v.id, v)).collect();

    let (past, upcoming) = split_past_upcoming(shows, now);
    let past_shows = show_entries(past, &venues_by_id);
    let upcoming_shows = show_entries(upcoming, &venues_by_id);

    Ok(Json(ArtistDetail {
        id: artist.id,
        name: artist.name,
        genres: genres.into_iter().map(|g| g.name).collect(),
        city: artist.city,
        state: artist.state,
        phone: artist.phone,
        website: artist.website_link,
        facebook_link: artist.facebook_link,
        seeking_venue: artist.seeking_venue,
        seeking_description: artist.seeking_description,
        image_link: artist.image_link,
        past_shows_count: past_shows.len(),
        upcoming_shows_count: upcoming_shows.len(),
        past_shows,
        upcoming_shows,
    }))
}

/// GET /artists/create
pub async fn create_artist_form() -> Json<FormChoices> {
    Json(form_choices())
}

/// POST /artists/create
pub async fn create_artist(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ArtistForm>,
) -> Result<(StatusCode, Json<Flash>), ApiError> {
    let fail = format!(
        "An error occurred. Artist {} could not be listed.",
        form.name
    );

    if let Err(reason) = form.validate() {
        return Err(flash_error(StoreError::Validation(reason), &fail));
    }

    let now = Utc::now().fixed_offset();
    let txn = state
        .db
        .begin()
        .await
        .map_err(|e| flash_error(StoreError::Database(e), &fail))?;

    let artist = artist::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(form.name.clone()),
        city: Set(form.city),
        state: Set(form.state),
        phone: Set(form.phone),
        website_link: Set(form.website_link),
        facebook_link: Set(form.facebook_link),
        seeking_venue: Set(form.seeking_venue),
        seeking_description: Set(form.seeking_description),
        image_link: Set(form.image_link),
        created_at: Set(now),
    }
    .insert(&txn)
    .await
    .map_err(|e| flash_error(StoreError::Database(e), &fail))?;

    ops::replace_artist_genres(&txn, artist.id, &form.genres)
        .await
        .map_err(|e| flash_error(e, &fail))?;

    txn.commit()
        .await
        .map_err(|e| flash_error(StoreError::Database(e), &fail))?;

    Ok((
        StatusCode::CREATED,
        Json(Flash::new(format!(
            "Artist {} was successfully listed!",
            artist.name
        ))),
    ))
}

/// GET /artists/:id/edit
pub async fn edit_artist_form(
    State(state): State<Arc<AppState>>,
    Path(artist_id): Path<Uuid>,
) -> Result<Json<ArtistFormData>, ApiError> {
    let artist = artist::Entity::find_by_id(artist_id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("Artist"))?;

    let genres = artist
        .find_related(genre::Entity)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    Ok(Json(ArtistFormData {
        name: artist.name,
        genres: genres.into_iter().map(|g| g.name).collect(),
        city: artist.city,
        state: artist.state,
        phone: artist.phone,
        website_link: artist.website_link,
        facebook_link: artist.facebook_link,
        seeking_venue: artist.seeking_venue,
        seeking_description: artist.seeking_description,
        image_link: artist.image_link,
    }))
}

/// POST /artists/:id/edit
///
/// Full replace of the scalar fields and of the genre set.
pub async fn edit_artist(
    State(state): State<Arc<AppState>>,
    Path(artist_id): Path<Uuid>,
    Json(form): Json<ArtistForm>,
) -> Result<Json<Flash>, ApiError> {
    let fail = format!(
        "An error occurred. Artist {} could not be updated.",
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

    let existing = artist::Entity::find_by_id(artist_id)
        .one(&txn)
        .await
        .map_err(|e| flash_error(StoreError::Database(e), &fail))?
        .ok_or_else(|| not_found("Artist"))?;

    let mut active: artist::ActiveModel = existing.into();
    active.name = Set(form.name.clone());
    active.city = Set(form.city);
    active.state = Set(form.state);
    active.phone = Set(form.phone);
    active.website_link = Set(form.website_link);
    active.facebook_link = Set(form.facebook_link);
    active.seeking_venue = Set(form.seeking_venue);
    active.seeking_description = Set(form.seeking_description);
    active.image_link = Set(form.image_link);

    let artist = active
        .update(&txn)
        .await
        .map_err(|e| flash_error(StoreError::Database(e), &fail))?;

    ops::replace_artist_genres(&txn, artist.id, &form.genres)
        .await
        .map_err(|e| flash_error(e, &fail))?;

    txn.commit()
        .await
        .map_err(|e| flash_error(StoreError::Database(e), &fail))?;

    Ok(Json(Flash::new(format!(
        "Artist {} was successfully updated!",
        artist.name
    ))))
}

/// Delete an artist and, via the relationship cascade, its shows and
/// genre links. The orphan sweep runs in the same transaction.
async fn delete_artist_by_id(
    db: &DatabaseConnection,
    artist_id: Uuid,
) -> Result<String, StoreError> {
    let txn = db.begin().await?;

    let artist = artist::Entity::find_by_id(artist_id)
        .one(&txn)
        .await?
        .ok_or(StoreError::NotFound("Artist"))?;
    let name = artist.name;

    artist::Entity::delete_by_id(artist_id).exec(&txn).await?;
    ops::cleanup_orphan_shows(&txn).await?;

    txn.commit().await?;
    Ok(name)
}

/// DELETE /artists/:id
pub async fn delete_artist(
    State(state): State<Arc<AppState>>,
    Path(artist_id): Path<Uuid>,
) -> Result<Json<DeletedArtist>, ApiError> {
    let name = delete_artist_by_id(&state.db, artist_id)
        .await
        .map_err(|e| {
            flash_error(e, "An error occurred. The selected artist could not be deleted.")
        })?;
    Ok(Json(DeletedArtist { name }))
}

/// POST /artists/:id/delete
pub async fn delete_artist_submission(
    State(state): State<Arc<AppState>>,
    Path(artist_id): Path<Uuid>,
) -> Result<Json<Flash>, ApiError> {
    let name = delete_artist_by_id(&state.db, artist_id)
        .await
        .map_err(|e| {
            flash_error(e, "An error occurred. The selected artist could not be deleted.")
        })?;
    Ok(Json(Flash::new(format!(
        "Artist {name} was successfully deleted."
    ))))
}
