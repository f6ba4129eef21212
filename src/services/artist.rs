use std::sync::Arc;

use chrono::{NaiveDateTime, NaiveTime};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::instrument;

use crate::database::Database;
use crate::entities;
use crate::services::availability::AvailabilityWindow;
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::genre::{resolve_genres, set_artist_genres};
use crate::services::search::{ListingSummary, NameMatcher, SearchResults};
use crate::services::show::{ArtistShow, ShowCounts, ShowService};
use crate::services::validation;

#[derive(Debug, Clone)]
pub struct ArtistInput {
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub time_available_from: NaiveTime,
    pub time_available_to: NaiveTime,
    pub genres: Vec<String>,
}

struct ArtistFields {
    name: String,
    city: Option<String>,
    state: Option<String>,
    phone: Option<String>,
    image_link: Option<String>,
    facebook_link: Option<String>,
    website_link: Option<String>,
    seeking_venue: bool,
    seeking_description: Option<String>,
    window: AvailabilityWindow,
}

impl ArtistInput {
    fn validate(&self) -> ServiceResult<ArtistFields> {
        Ok(ArtistFields {
            name: validation::required("Name", &self.name)?,
            city: validation::optional(self.city.clone()),
            state: validation::optional(self.state.clone()),
            phone: validation::optional(self.phone.clone()),
            image_link: validation::link("Image link", self.image_link.clone())?,
            facebook_link: validation::link("Facebook link", self.facebook_link.clone())?,
            website_link: validation::link("Website link", self.website_link.clone())?,
            seeking_venue: self.seeking_venue,
            seeking_description: validation::optional(self.seeking_description.clone()),
            window: AvailabilityWindow::new(self.time_available_from, self.time_available_to),
        })
    }
}

impl ArtistFields {
    fn apply(self, artist: &mut entities::artist::ActiveModel) {
        if self.window.is_empty() {
            log::warn!(
                "Artist '{}' has an empty availability window ({}-{}); no show can be booked",
                self.name,
                self.window.from,
                self.window.to
            );
        }

        artist.name = Set(self.name);
        artist.city = Set(self.city);
        artist.state = Set(self.state);
        artist.phone = Set(self.phone);
        artist.image_link = Set(self.image_link);
        artist.facebook_link = Set(self.facebook_link);
        artist.website_link = Set(self.website_link);
        artist.seeking_venue = Set(self.seeking_venue);
        artist.seeking_description = Set(self.seeking_description);
        artist.time_available_from = Set(self.window.from);
        artist.time_available_to = Set(self.window.to);
    }
}

pub struct ArtistDetail {
    pub artist: entities::artist::Model,
    pub genres: Vec<String>,
    pub past_shows: Vec<ArtistShow>,
    pub upcoming_shows: Vec<ArtistShow>,
    pub counts: ShowCounts,
}

pub struct ArtistService {
    db: Arc<Database>,
}

impl ArtistService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Every artist ordered by name, with upcoming show counts.
    pub async fn list(&self, now: NaiveDateTime) -> ServiceResult<Vec<ListingSummary>> {
        let artists = entities::artist::Entity::find()
            .order_by_asc(entities::artist::Column::Name)
            .all(&self.db.conn)
            .await?;
        Ok(self.summarize(artists, now).await?.items)
    }

    pub async fn get(&self, artist_id: i64, now: NaiveDateTime) -> ServiceResult<ArtistDetail> {
        let artist = entities::artist::Entity::find_by_id(artist_id)
            .one(&self.db.conn)
            .await?
            .ok_or(ServiceError::not_found("Artist", artist_id))?;

        let genres = artist
            .find_related(entities::genre::Entity)
            .order_by_asc(entities::genre::Column::Name)
            .all(&self.db.conn)
            .await?
            .into_iter()
            .map(|g| g.name)
            .collect();

        let shows = ShowService::new(self.db.clone());
        let upcoming_shows = shows.upcoming_for_artist(artist_id, now).await?;
        let past_shows = shows.past_for_artist(artist_id, now).await?;
        let counts = shows.count_for_artist(artist_id, now).await?;

        Ok(ArtistDetail {
            artist,
            genres,
            past_shows,
            upcoming_shows,
            counts,
        })
    }

    pub async fn search_by_name(
        &self,
        search_term: &str,
        now: NaiveDateTime,
    ) -> ServiceResult<SearchResults> {
        let artists = entities::artist::Entity::find()
            .order_by_asc(entities::artist::Column::Name)
            .all(&self.db.conn)
            .await?;
        let artists = NameMatcher::new(search_term).filter(artists, |a| a.name.as_str());
        self.summarize(artists, now).await
    }

    pub async fn search_by_city(
        &self,
        city: &str,
        state: &str,
        now: NaiveDateTime,
    ) -> ServiceResult<SearchResults> {
        let artists = entities::artist::Entity::find()
            .filter(entities::artist::Column::City.eq(city))
            .filter(entities::artist::Column::State.eq(state))
            .order_by_asc(entities::artist::Column::Name)
            .all(&self.db.conn)
            .await?;
        self.summarize(artists, now).await
    }

    pub async fn recent(&self, limit: u64) -> ServiceResult<Vec<entities::artist::Model>> {
        let artists = entities::artist::Entity::find()
            .order_by_desc(entities::artist::Column::CreatedAt)
            .order_by_desc(entities::artist::Column::Id)
            .limit(limit)
            .all(&self.db.conn)
            .await?;
        Ok(artists)
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: ArtistInput) -> ServiceResult<entities::artist::Model> {
        let fields = input.validate()?;
        let name = fields.name.clone();

        let txn = self.db.conn.begin().await?;

        let mut artist = entities::artist::ActiveModel::new();
        fields.apply(&mut artist);
        let artist = artist.insert(&txn).await.map_err(|e| {
            ServiceError::from_write(
                e,
                format!("An error occurred. Artist {name} could not be listed."),
            )
        })?;

        let genres = resolve_genres(&txn, &input.genres).await?;
        set_artist_genres(&txn, artist.id, &genres).await?;

        txn.commit().await?;

        log::info!("Artist created: '{}' (ID: {})", artist.name, artist.id);
        Ok(artist)
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn update(
        &self,
        artist_id: i64,
        input: ArtistInput,
    ) -> ServiceResult<entities::artist::Model> {
        let fields = input.validate()?;

        let txn = self.db.conn.begin().await?;

        let existing = entities::artist::Entity::find_by_id(artist_id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::not_found("Artist", artist_id))?;

        let mut artist: entities::artist::ActiveModel = existing.into();
        fields.apply(&mut artist);
        let artist = artist.update(&txn).await.map_err(|e| {
            ServiceError::from_write(e, format!("Artist {artist_id} could not be updated."))
        })?;

        let genres = resolve_genres(&txn, &input.genres).await?;
        set_artist_genres(&txn, artist.id, &genres).await?;

        txn.commit().await?;

        log::info!("Artist updated: '{}' (ID: {})", artist.name, artist.id);
        Ok(artist)
    }

    /// Unlist an artist. Refused while the artist still has shows on record.
    #[instrument(skip(self))]
    pub async fn delete(&self, artist_id: i64) -> ServiceResult<()> {
        let result = entities::artist::Entity::delete_by_id(artist_id)
            .exec(&self.db.conn)
            .await
            .map_err(|e| {
                ServiceError::from_write(
                    e,
                    format!("Artist {artist_id} still has scheduled shows and cannot be unlisted"),
                )
            })?;

        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Artist", artist_id));
        }

        log::info!("Artist unlisted (ID: {})", artist_id);
        Ok(())
    }

    async fn summarize(
        &self,
        artists: Vec<entities::artist::Model>,
        now: NaiveDateTime,
    ) -> ServiceResult<SearchResults> {
        let counts = ShowService::new(self.db.clone())
            .upcoming_counts_by_artist(now)
            .await?;

        Ok(SearchResults::new(
            artists
                .into_iter()
                .map(|artist| ListingSummary {
                    num_upcoming_shows: counts.get(&artist.id).copied().unwrap_or(0),
                    id: artist.id,
                    name: artist.name,
                })
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::venue::VenueService;
    use crate::test_utils::{artist_input, at, insert_artist, insert_venue, test_db, time};
    use sea_orm::PaginatorTrait;

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_db().await;
        let service = ArtistService::new(db.clone());

        let mut input = artist_input("Guns N Petals", time(10, 0), time(23, 0), &["Rock n Roll"]);
        input.website_link = Some("https://www.gunsnpetalsband.com".into());
        input.seeking_venue = true;
        input.seeking_description =
            Some("Looking for shows to perform at in the San Francisco Bay Area!".into());
        let artist = service.create(input).await.unwrap();

        let detail = service.get(artist.id, at(2024, 1, 1, 0, 0)).await.unwrap();
        assert_eq!(detail.artist.name, "Guns N Petals");
        assert_eq!(detail.artist.time_available_from, time(10, 0));
        assert!(detail.artist.seeking_venue);
        assert_eq!(detail.genres, vec!["Rock n Roll"]);
        assert!(detail.past_shows.is_empty());
        assert!(detail.upcoming_shows.is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_artist() {
        let db = test_db().await;
        let service = ArtistService::new(db);

        let result = service.get(42, at(2024, 1, 1, 0, 0)).await;
        assert!(matches!(
            result,
            Err(ServiceError::NotFound { entity: "Artist", id: 42 })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_name_is_rejected_without_side_effects() {
        let db = test_db().await;
        let service = ArtistService::new(db.clone());
        service
            .create(artist_input("Guns N Petals", time(10, 0), time(23, 0), &[]))
            .await
            .unwrap();

        let result = service
            .create(artist_input("Guns N Petals", time(9, 0), time(17, 0), &["Rock n Roll"]))
            .await;

        assert!(matches!(result, Err(ServiceError::Constraint(_))));
        assert_eq!(
            entities::artist::Entity::find().count(&db.conn).await.unwrap(),
            1
        );
        assert_eq!(
            entities::genre::Entity::find().count(&db.conn).await.unwrap(),
            0
        );
        assert_eq!(
            entities::artist_genre::Entity::find()
                .count(&db.conn)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_create_rejects_bad_link() {
        let db = test_db().await;
        let service = ArtistService::new(db.clone());

        let mut input = artist_input("Matt Quevedo", time(9, 0), time(17, 0), &[]);
        input.facebook_link = Some("facebook/mattquevedo".into());

        let result = service.create(input).await;
        assert!(matches!(result, Err(ServiceError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_update_replaces_genres() {
        let db = test_db().await;
        let service = ArtistService::new(db.clone());
        let artist = service
            .create(artist_input("Matt Quevedo", time(9, 0), time(17, 0), &["Jazz"]))
            .await
            .unwrap();

        let updated = service
            .update(
                artist.id,
                artist_input("Matt Quevedo", time(12, 0), time(22, 0), &["Blues", "Jazz"]),
            )
            .await
            .unwrap();
        assert_eq!(updated.time_available_from, time(12, 0));

        let detail = service.get(artist.id, at(2024, 1, 1, 0, 0)).await.unwrap();
        assert_eq!(detail.genres, vec!["Blues", "Jazz"]);
    }

    #[tokio::test]
    async fn test_delete_without_shows() {
        let db = test_db().await;
        let service = ArtistService::new(db.clone());
        let artist = service
            .create(artist_input("The Wild Sax Band", time(9, 0), time(17, 0), &["Jazz"]))
            .await
            .unwrap();

        service.delete(artist.id).await.unwrap();

        assert_eq!(
            entities::artist::Entity::find().count(&db.conn).await.unwrap(),
            0
        );
        assert_eq!(
            entities::artist_genre::Entity::find()
                .count(&db.conn)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_delete_is_refused_while_shows_exist() {
        let db = test_db().await;
        let venue_id = insert_venue(&db, "The Musical Hop").await;
        let artist_id = insert_artist(&db, "Guns N Petals").await;
        ShowService::new(db.clone())
            .create(artist_id, venue_id, at(2019, 5, 21, 21, 30))
            .await
            .unwrap();

        let result = ArtistService::new(db.clone()).delete(artist_id).await;

        assert!(matches!(result, Err(ServiceError::Constraint(_))));
        assert_eq!(
            entities::show::Entity::find().count(&db.conn).await.unwrap(),
            1
        );
        assert_eq!(
            entities::artist::Entity::find().count(&db.conn).await.unwrap(),
            1
        );

        // Once the venue is gone the shows go with it and the artist can leave
        VenueService::new(db.clone()).delete(venue_id).await.unwrap();
        ArtistService::new(db.clone()).delete(artist_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing_artist() {
        let db = test_db().await;
        let result = ArtistService::new(db).delete(3).await;
        assert!(matches!(
            result,
            Err(ServiceError::NotFound { entity: "Artist", id: 3 })
        ));
    }

    #[tokio::test]
    async fn test_search_by_name() {
        let db = test_db().await;
        for name in ["Guns N Petals", "Matt Quevedo", "The Wild Sax Band"] {
            insert_artist(&db, name).await;
        }
        let service = ArtistService::new(db.clone());
        let now = at(2024, 1, 1, 0, 0);

        let a = service.search_by_name("A", now).await.unwrap();
        assert_eq!(a.count, 3);

        let band = service.search_by_name("band", now).await.unwrap();
        assert_eq!(band.count, 1);
        assert_eq!(band.items[0].name, "The Wild Sax Band");

        let none = service.search_by_name("zzz", now).await.unwrap();
        assert_eq!(none.count, 0);
        assert!(none.items.is_empty());

        let wildcard = service.search_by_name("_", now).await.unwrap();
        assert_eq!(wildcard.count, 0);

        insert_artist(&db, "Ólafur Arnalds").await;
        let folded = service.search_by_name("ólafur", now).await.unwrap();
        assert_eq!(folded.count, 1);
        assert_eq!(folded.items[0].name, "Ólafur Arnalds");
    }

    #[tokio::test]
    async fn test_search_by_city_and_list_counts() {
        let db = test_db().await;
        let venue_id = insert_venue(&db, "The Musical Hop").await;
        let service = ArtistService::new(db.clone());
        let local = insert_artist(&db, "Guns N Petals").await;
        let mut remote = artist_input("Matt Quevedo", time(0, 0), time(23, 0), &[]);
        remote.city = Some("New York".into());
        remote.state = Some("NY".into());
        service.create(remote).await.unwrap();

        ShowService::new(db.clone())
            .create(local, venue_id, at(2035, 4, 1, 20, 0))
            .await
            .unwrap();

        let now = at(2024, 1, 1, 0, 0);
        let sf = service
            .search_by_city("San Francisco", "CA", now)
            .await
            .unwrap();
        assert_eq!(sf.count, 1);
        assert_eq!(sf.items[0].num_upcoming_shows, 1);

        let listed = service.list(now).await.unwrap();
        let names: Vec<&str> = listed.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Guns N Petals", "Matt Quevedo"]);
        assert_eq!(listed[1].num_upcoming_shows, 0);
    }

    #[tokio::test]
    async fn test_recent_limit() {
        let db = test_db().await;
        for name in ["Guns N Petals", "Matt Quevedo", "The Wild Sax Band"] {
            insert_artist(&db, name).await;
        }

        let recent = ArtistService::new(db).recent(1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].name, "The Wild Sax Band");
    }
}
