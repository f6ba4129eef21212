use std::sync::Arc;

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

use crate::database::Database;
use crate::entities;
use crate::services::error::ServiceResult;

/// Find or create one genre row per distinct name, in first-seen order.
///
/// Names are trimmed before matching, so `" Jazz"` and `"Jazz"` resolve to the
/// same row. Past trimming the match is exact and case-sensitive: `"jazz"` is a
/// different genre. Blank names are skipped.
pub async fn resolve_genres<C: ConnectionTrait>(
    conn: &C,
    names: &[String],
) -> Result<Vec<entities::genre::Model>, DbErr> {
    let mut genres: Vec<entities::genre::Model> = Vec::new();

    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        if genres.iter().any(|g| g.name == name) {
            continue;
        }

        let genre = match find_genre(conn, name).await? {
            Some(genre) => genre,
            None => {
                log::debug!("Creating genre '{}'", name);
                insert_if_absent(conn, name).await?;
                find_genre(conn, name)
                    .await?
                    .ok_or_else(|| DbErr::RecordNotFound(format!("Genre '{name}'")))?
            }
        };
        genres.push(genre);
    }

    Ok(genres)
}

async fn find_genre<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> Result<Option<entities::genre::Model>, DbErr> {
    entities::genre::Entity::find()
        .filter(entities::genre::Column::Name.eq(name))
        .one(conn)
        .await
}

/// Insert a genre unless another writer already has; a lost race is not an error.
async fn insert_if_absent<C: ConnectionTrait>(conn: &C, name: &str) -> Result<(), DbErr> {
    entities::genre::Entity::insert(entities::genre::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::column(entities::genre::Column::Name)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;
    Ok(())
}

/// Replace the genre set of a venue.
pub async fn set_venue_genres<C: ConnectionTrait>(
    conn: &C,
    venue_id: i64,
    genres: &[entities::genre::Model],
) -> Result<(), DbErr> {
    entities::venue_genre::Entity::delete_many()
        .filter(entities::venue_genre::Column::VenueId.eq(venue_id))
        .exec(conn)
        .await?;

    for genre in genres {
        entities::venue_genre::ActiveModel {
            venue_id: Set(venue_id),
            genre_id: Set(genre.id),
        }
        .insert(conn)
        .await?;
    }

    Ok(())
}

/// Replace the genre set of an artist.
pub async fn set_artist_genres<C: ConnectionTrait>(
    conn: &C,
    artist_id: i64,
    genres: &[entities::genre::Model],
) -> Result<(), DbErr> {
    entities::artist_genre::Entity::delete_many()
        .filter(entities::artist_genre::Column::ArtistId.eq(artist_id))
        .exec(conn)
        .await?;

    for genre in genres {
        entities::artist_genre::ActiveModel {
            artist_id: Set(artist_id),
            genre_id: Set(genre.id),
        }
        .insert(conn)
        .await?;
    }

    Ok(())
}

pub struct GenreService {
    db: Arc<Database>,
}

impl GenreService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> ServiceResult<Vec<entities::genre::Model>> {
        let genres = entities::genre::Entity::find()
            .order_by_asc(entities::genre::Column::Name)
            .all(&self.db.conn)
            .await?;
        Ok(genres)
    }
}
