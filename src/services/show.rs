use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set,
};
use tracing::instrument;

use crate::database::Database;
use crate::entities;
use crate::services::availability::AvailabilityWindow;
use crate::services::error::{ServiceError, ServiceResult};

/// Which side of `now` a show falls on. A show starting exactly at `now` is
/// past.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowTiming {
    Past,
    Upcoming,
}

impl ShowTiming {
    pub fn classify(start_time: NaiveDateTime, now: NaiveDateTime) -> Self {
        if start_time > now {
            ShowTiming::Upcoming
        } else {
            ShowTiming::Past
        }
    }

    /// Restrict a show query to this side of `now`.
    fn restrict(
        self,
        query: Select<entities::show::Entity>,
        now: NaiveDateTime,
    ) -> Select<entities::show::Entity> {
        match self {
            ShowTiming::Upcoming => query.filter(entities::show::Column::StartTime.gt(now)),
            ShowTiming::Past => query.filter(entities::show::Column::StartTime.lte(now)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShowCounts {
    pub past: u64,
    pub upcoming: u64,
}

/// A show seen from its venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueShow {
    pub show_id: i64,
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: NaiveDateTime,
}

/// A show seen from its artist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistShow {
    pub show_id: i64,
    pub venue_id: i64,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub start_time: NaiveDateTime,
}

/// A show with both of its sides, for the global listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowListing {
    pub show_id: i64,
    pub venue_id: i64,
    pub venue_name: String,
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: NaiveDateTime,
}

pub struct ShowService {
    db: Arc<Database>,
}

impl ShowService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn upcoming_for_venue(
        &self,
        venue_id: i64,
        now: NaiveDateTime,
    ) -> ServiceResult<Vec<VenueShow>> {
        self.venue_shows(venue_id, ShowTiming::Upcoming, now).await
    }

    pub async fn past_for_venue(
        &self,
        venue_id: i64,
        now: NaiveDateTime,
    ) -> ServiceResult<Vec<VenueShow>> {
        self.venue_shows(venue_id, ShowTiming::Past, now).await
    }

    pub async fn upcoming_for_artist(
        &self,
        artist_id: i64,
        now: NaiveDateTime,
    ) -> ServiceResult<Vec<ArtistShow>> {
        self.artist_shows(artist_id, ShowTiming::Upcoming, now).await
    }

    pub async fn past_for_artist(
        &self,
        artist_id: i64,
        now: NaiveDateTime,
    ) -> ServiceResult<Vec<ArtistShow>> {
        self.artist_shows(artist_id, ShowTiming::Past, now).await
    }

    pub async fn count_for_venue(
        &self,
        venue_id: i64,
        now: NaiveDateTime,
    ) -> ServiceResult<ShowCounts> {
        self.counts(entities::show::Column::VenueId, venue_id, now)
            .await
    }

    pub async fn count_for_artist(
        &self,
        artist_id: i64,
        now: NaiveDateTime,
    ) -> ServiceResult<ShowCounts> {
        self.counts(entities::show::Column::ArtistId, artist_id, now)
            .await
    }

    /// Upcoming show count per venue, for every venue that has at least one.
    pub async fn upcoming_counts_by_venue(
        &self,
        now: NaiveDateTime,
    ) -> ServiceResult<HashMap<i64, u64>> {
        self.upcoming_counts_by(entities::show::Column::VenueId, now)
            .await
    }

    /// Upcoming show count per artist, for every artist that has at least one.
    pub async fn upcoming_counts_by_artist(
        &self,
        now: NaiveDateTime,
    ) -> ServiceResult<HashMap<i64, u64>> {
        self.upcoming_counts_by(entities::show::Column::ArtistId, now)
            .await
    }

    /// Every show with venue and artist names, ordered by start time.
    pub async fn list(&self) -> ServiceResult<Vec<ShowListing>> {
        self.listings(entities::show::Entity::find()).await
    }

    pub async fn get(&self, show_id: i64) -> ServiceResult<ShowListing> {
        self.listings(entities::show::Entity::find_by_id(show_id))
            .await?
            .into_iter()
            .next()
            .ok_or(ServiceError::not_found("Show", show_id))
    }

    async fn listings(
        &self,
        query: Select<entities::show::Entity>,
    ) -> ServiceResult<Vec<ShowListing>> {
        let shows = query
            .order_by_asc(entities::show::Column::StartTime)
            .order_by_asc(entities::show::Column::Id)
            .find_also_related(entities::venue::Entity)
            .all(&self.db.conn)
            .await?;

        let artist_ids: Vec<i64> = shows.iter().map(|(show, _)| show.artist_id).collect();
        let artists: HashMap<i64, entities::artist::Model> = entities::artist::Entity::find()
            .filter(entities::artist::Column::Id.is_in(artist_ids))
            .all(&self.db.conn)
            .await?
            .into_iter()
            .map(|artist| (artist.id, artist))
            .collect();

        shows
            .into_iter()
            .map(|(show, venue)| {
                let venue = venue.ok_or(ServiceError::not_found("Venue", show.venue_id))?;
                let artist = artists
                    .get(&show.artist_id)
                    .ok_or(ServiceError::not_found("Artist", show.artist_id))?;
                Ok(ShowListing {
                    show_id: show.id,
                    venue_id: venue.id,
                    venue_name: venue.name,
                    artist_id: artist.id,
                    artist_name: artist.name.clone(),
                    artist_image_link: artist.image_link.clone(),
                    start_time: show.start_time,
                })
            })
            .collect()
    }

    /// Book an artist at a venue. The artist's availability window is checked
    /// before anything is written.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        artist_id: i64,
        venue_id: i64,
        start_time: NaiveDateTime,
    ) -> ServiceResult<entities::show::Model> {
        let artist = entities::artist::Entity::find_by_id(artist_id)
            .one(&self.db.conn)
            .await?
            .ok_or(ServiceError::not_found("Artist", artist_id))?;

        entities::venue::Entity::find_by_id(venue_id)
            .one(&self.db.conn)
            .await?
            .ok_or(ServiceError::not_found("Venue", venue_id))?;

        if !AvailabilityWindow::for_artist(&artist).admits(start_time) {
            log::info!(
                "Rejected show for artist '{}' at {}: outside {}-{}",
                artist.name,
                start_time,
                artist.time_available_from,
                artist.time_available_to
            );
            return Err(ServiceError::ArtistUnavailable {
                artist: artist.name,
            });
        }

        let show = entities::show::ActiveModel {
            artist_id: Set(artist_id),
            venue_id: Set(venue_id),
            start_time: Set(start_time),
            ..Default::default()
        }
        .insert(&self.db.conn)
        .await
        .map_err(|e| ServiceError::from_write(e, "An error occurred. Show couldn't be listed."))?;

        log::info!(
            "Show created: artist {} at venue {} on {} (ID: {})",
            artist_id,
            venue_id,
            start_time,
            show.id
        );
        Ok(show)
    }

    async fn venue_shows(
        &self,
        venue_id: i64,
        timing: ShowTiming,
        now: NaiveDateTime,
    ) -> ServiceResult<Vec<VenueShow>> {
        let query = entities::show::Entity::find()
            .filter(entities::show::Column::VenueId.eq(venue_id));

        let rows = timing
            .restrict(query, now)
            .order_by_asc(entities::show::Column::StartTime)
            .find_also_related(entities::artist::Entity)
            .all(&self.db.conn)
            .await?;

        rows.into_iter()
            .map(|(show, artist)| {
                let artist = artist.ok_or(ServiceError::not_found("Artist", show.artist_id))?;
                Ok(VenueShow {
                    show_id: show.id,
                    artist_id: artist.id,
                    artist_name: artist.name,
                    artist_image_link: artist.image_link,
                    start_time: show.start_time,
                })
            })
            .collect()
    }

    async fn artist_shows(
        &self,
        artist_id: i64,
        timing: ShowTiming,
        now: NaiveDateTime,
    ) -> ServiceResult<Vec<ArtistShow>> {
        let query = entities::show::Entity::find()
            .filter(entities::show::Column::ArtistId.eq(artist_id));

        let rows = timing
            .restrict(query, now)
            .order_by_asc(entities::show::Column::StartTime)
            .find_also_related(entities::venue::Entity)
            .all(&self.db.conn)
            .await?;

        rows.into_iter()
            .map(|(show, venue)| {
                let venue = venue.ok_or(ServiceError::not_found("Venue", show.venue_id))?;
                Ok(ArtistShow {
                    show_id: show.id,
                    venue_id: venue.id,
                    venue_name: venue.name,
                    venue_image_link: venue.image_link,
                    start_time: show.start_time,
                })
            })
            .collect()
    }

    async fn counts(
        &self,
        owner: entities::show::Column,
        owner_id: i64,
        now: NaiveDateTime,
    ) -> ServiceResult<ShowCounts> {
        let query = entities::show::Entity::find().filter(owner.eq(owner_id));

        let upcoming = ShowTiming::Upcoming
            .restrict(query.clone(), now)
            .count(&self.db.conn)
            .await?;
        let past = ShowTiming::Past
            .restrict(query, now)
            .count(&self.db.conn)
            .await?;

        Ok(ShowCounts { past, upcoming })
    }

    async fn upcoming_counts_by(
        &self,
        owner: entities::show::Column,
        now: NaiveDateTime,
    ) -> ServiceResult<HashMap<i64, u64>> {
        let query = entities::show::Entity::find()
            .select_only()
            .column(owner)
            .column_as(entities::show::Column::Id.count(), "upcoming")
            .group_by(owner);

        let rows: Vec<(i64, i64)> = ShowTiming::Upcoming
            .restrict(query, now)
            .into_tuple()
            .all(&self.db.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, count as u64))
            .collect())
    }
}
