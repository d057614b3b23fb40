//! Domain operations shared by the write paths.
//!
//! Everything here is generic over [`ConnectionTrait`] so the same
//! function runs against the pool, or inside the single transaction a
//! write handler opens.

use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::{artist_genre, genre, show, venue_genre};
use crate::error::StoreError;

/// Return the genre with the given name, creating it if absent.
///
/// Lookup-before-insert keeps genre names unique without a schema
/// constraint. Within one transaction the inserted row is visible to
/// the next lookup, so repeated resolution of a name never duplicates
/// it.
pub async fn resolve_genre<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<genre::Model, StoreError> {
    if let Some(existing) = genre::Entity::find()
        .filter(genre::Column::Name.eq(name))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    let created = genre::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_owned()),
    }
    .insert(db)
    .await?;
    tracing::debug!(genre = %created.name, "created genre");
    Ok(created)
}

/// Replace a venue's genre set with the submitted names.
///
/// Full replace: the previous associations are cleared, then each name
/// is resolved and linked. Never a diff/merge.
pub async fn replace_venue_genres<C: ConnectionTrait>(
    db: &C,
    venue_id: Uuid,
    names: &[String],
) -> Result<(), StoreError> {
    venue_genre::Entity::delete_many()
        .filter(venue_genre::Column::VenueId.eq(venue_id))
        .exec(db)
        .await?;

    for name in dedup_names(names) {
        let genre = resolve_genre(db, name).await?;
        venue_genre::ActiveModel {
            venue_id: Set(venue_id),
            genre_id: Set(genre.id),
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

/// Replace an artist's genre set with the submitted names.
pub async fn replace_artist_genres<C: ConnectionTrait>(
    db: &C,
    artist_id: Uuid,
    names: &[String],
) -> Result<(), StoreError> {
    artist_genre::Entity::delete_many()
        .filter(artist_genre::Column::ArtistId.eq(artist_id))
        .exec(db)
        .await?;

    for name in dedup_names(names) {
        let genre = resolve_genre(db, name).await?;
        artist_genre::ActiveModel {
            artist_id: Set(artist_id),
            genre_id: Set(genre.id),
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

/// Delete show rows whose venue or artist reference is null.
///
/// Must run inside the same transaction as any write that touches show
/// rows, so no committed state ever contains an orphan. Returns the
/// number of rows removed.
pub async fn cleanup_orphan_shows<C: ConnectionTrait>(db: &C) -> Result<u64, StoreError> {
    let no_venue = show::Entity::delete_many()
        .filter(show::Column::VenueId.is_null())
        .exec(db)
        .await?;
    let no_artist = show::Entity::delete_many()
        .filter(show::Column::ArtistId.is_null())
        .exec(db)
        .await?;

    let removed = no_venue.rows_affected + no_artist.rows_affected;
    if removed > 0 {
        tracing::info!(removed, "deleted orphaned shows");
    }
    Ok(removed)
}

/// Count a venue's shows starting strictly after `now`.
pub async fn upcoming_shows_for_venue<C: ConnectionTrait>(
    db: &C,
    venue_id: Uuid,
    now: DateTimeWithTimeZone,
) -> Result<u64, DbErr> {
    show::Entity::find()
        .filter(show::Column::VenueId.eq(venue_id))
        .filter(show::Column::StartTime.gt(now))
        .count(db)
        .await
}

/// Count an artist's shows starting strictly after `now`.
pub async fn upcoming_shows_for_artist<C: ConnectionTrait>(
    db: &C,
    artist_id: Uuid,
    now: DateTimeWithTimeZone,
) -> Result<u64, DbErr> {
    show::Entity::find()
        .filter(show::Column::ArtistId.eq(artist_id))
        .filter(show::Column::StartTime.gt(now))
        .count(db)
        .await
}

/// First occurrence wins; submitted order is preserved.
fn dedup_names(names: &[String]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::with_capacity(names.len());
    for name in names {
        if !seen.contains(&name.as_str()) {
            seen.push(name.as_str());
        }
    }
    seen
}
