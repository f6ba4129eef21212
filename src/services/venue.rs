use std::sync::Arc;

use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::instrument;

use crate::database::Database;
use crate::entities;
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::genre::{resolve_genres, set_venue_genres};
use crate::services::search::{ListingSummary, NameMatcher, SearchResults};
use crate::services::show::{ShowCounts, ShowService, VenueShow};
use crate::services::validation;

/// Everything needed to list or edit a venue.
#[derive(Debug, Clone)]
pub struct VenueInput {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub genres: Vec<String>,
}

/// Validated copy of a `VenueInput`.
struct VenueFields {
    name: String,
    city: String,
    state: String,
    address: String,
    phone: String,
    image_link: Option<String>,
    facebook_link: Option<String>,
    website_link: Option<String>,
    seeking_talent: bool,
    seeking_description: Option<String>,
}

impl VenueInput {
    fn validate(&self) -> ServiceResult<VenueFields> {
        Ok(VenueFields {
            name: validation::required("Name", &self.name)?,
            city: validation::required("City", &self.city)?,
            state: validation::required("State", &self.state)?,
            address: validation::required("Address", &self.address)?,
            phone: validation::required("Phone", &self.phone)?,
            image_link: validation::link("Image link", self.image_link.clone())?,
            facebook_link: validation::link("Facebook link", self.facebook_link.clone())?,
            website_link: validation::link("Website link", self.website_link.clone())?,
            seeking_talent: self.seeking_talent,
            seeking_description: validation::optional(self.seeking_description.clone()),
        })
    }
}

impl VenueFields {
    fn apply(self, venue: &mut entities::venue::ActiveModel) {
        venue.name = Set(self.name);
        venue.city = Set(self.city);
        venue.state = Set(self.state);
        venue.address = Set(self.address);
        venue.phone = Set(self.phone);
        venue.image_link = Set(self.image_link);
        venue.facebook_link = Set(self.facebook_link);
        venue.website_link = Set(self.website_link);
        venue.seeking_talent = Set(self.seeking_talent);
        venue.seeking_description = Set(self.seeking_description);
    }
}

pub struct VenueDetail {
    pub venue: entities::venue::Model,
    pub genres: Vec<String>,
    pub past_shows: Vec<VenueShow>,
    pub upcoming_shows: Vec<VenueShow>,
    pub counts: ShowCounts,
}

/// Venues sharing a city and state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueArea {
    pub city: String,
    pub state: String,
    pub venues: Vec<ListingSummary>,
}

pub struct VenueService {
    db: Arc<Database>,
}

impl VenueService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// All venues grouped by area, areas ordered by state then city.
    pub async fn list_by_area(&self, now: NaiveDateTime) -> ServiceResult<Vec<VenueArea>> {
        let venues = entities::venue::Entity::find()
            .order_by_asc(entities::venue::Column::State)
            .order_by_asc(entities::venue::Column::City)
            .order_by_asc(entities::venue::Column::Name)
            .all(&self.db.conn)
            .await?;

        let counts = ShowService::new(self.db.clone())
            .upcoming_counts_by_venue(now)
            .await?;

        let mut areas: Vec<VenueArea> = Vec::new();
        for venue in venues {
            let summary = ListingSummary {
                id: venue.id,
                num_upcoming_shows: counts.get(&venue.id).copied().unwrap_or(0),
                name: venue.name,
            };
            match areas.last_mut() {
                Some(area) if area.city == venue.city && area.state == venue.state => {
                    area.venues.push(summary)
                }
                _ => areas.push(VenueArea {
                    city: venue.city,
                    state: venue.state,
                    venues: vec![summary],
                }),
            }
        }

        Ok(areas)
    }

    pub async fn get(&self, venue_id: i64, now: NaiveDateTime) -> ServiceResult<VenueDetail> {
        let venue = entities::venue::Entity::find_by_id(venue_id)
            .one(&self.db.conn)
            .await?
            .ok_or(ServiceError::not_found("Venue", venue_id))?;

        let genres = venue
            .find_related(entities::genre::Entity)
            .order_by_asc(entities::genre::Column::Name)
            .all(&self.db.conn)
            .await?
            .into_iter()
            .map(|g| g.name)
            .collect();

        let shows = ShowService::new(self.db.clone());
        let upcoming_shows = shows.upcoming_for_venue(venue_id, now).await?;
        let past_shows = shows.past_for_venue(venue_id, now).await?;
        let counts = shows.count_for_venue(venue_id, now).await?;

        Ok(VenueDetail {
            venue,
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
        let venues = entities::venue::Entity::find()
            .order_by_asc(entities::venue::Column::Name)
            .all(&self.db.conn)
            .await?;
        let venues = NameMatcher::new(search_term).filter(venues, |v| v.name.as_str());
        self.summarize(venues, now).await
    }

    pub async fn search_by_city(
        &self,
        city: &str,
        state: &str,
        now: NaiveDateTime,
    ) -> ServiceResult<SearchResults> {
        let venues = entities::venue::Entity::find()
            .filter(entities::venue::Column::City.eq(city))
            .filter(entities::venue::Column::State.eq(state))
            .order_by_asc(entities::venue::Column::Name)
            .all(&self.db.conn)
            .await?;
        self.summarize(venues, now).await
    }

    /// Most recently listed venues first.
    pub async fn recent(&self, limit: u64) -> ServiceResult<Vec<entities::venue::Model>> {
        let venues = entities::venue::Entity::find()
            .order_by_desc(entities::venue::Column::CreatedAt)
            .order_by_desc(entities::venue::Column::Id)
            .limit(limit)
            .all(&self.db.conn)
            .await?;
        Ok(venues)
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: VenueInput) -> ServiceResult<entities::venue::Model> {
        let fields = input.validate()?;
        let name = fields.name.clone();

        let txn = self.db.conn.begin().await?;

        let mut venue = entities::venue::ActiveModel::new();
        fields.apply(&mut venue);
        let venue = venue.insert(&txn).await.map_err(|e| {
            ServiceError::from_write(
                e,
                format!("An error occurred while creating new venue. Venue {name} couldn't be listed."),
            )
        })?;

        let genres = resolve_genres(&txn, &input.genres).await?;
        set_venue_genres(&txn, venue.id, &genres).await?;

        txn.commit().await?;

        log::info!("Venue created: '{}' (ID: {})", venue.name, venue.id);
        Ok(venue)
    }

    /// Replace every field and the genre set of a venue.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn update(
        &self,
        venue_id: i64,
        input: VenueInput,
    ) -> ServiceResult<entities::venue::Model> {
        let fields = input.validate()?;

        let txn = self.db.conn.begin().await?;

        let existing = entities::venue::Entity::find_by_id(venue_id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::not_found("Venue", venue_id))?;

        let mut venue: entities::venue::ActiveModel = existing.into();
        fields.apply(&mut venue);
        let venue = venue.update(&txn).await.map_err(|e| {
            ServiceError::from_write(e, format!("Venue {venue_id} could not be updated."))
        })?;

        let genres = resolve_genres(&txn, &input.genres).await?;
        set_venue_genres(&txn, venue.id, &genres).await?;

        txn.commit().await?;

        log::info!("Venue updated: '{}' (ID: {})", venue.name, venue.id);
        Ok(venue)
    }

    /// Unlist a venue. Its shows and genre links go with it.
    #[instrument(skip(self))]
    pub async fn delete(&self, venue_id: i64) -> ServiceResult<()> {
        let result = entities::venue::Entity::delete_by_id(venue_id)
            .exec(&self.db.conn)
            .await
            .map_err(|e| {
                ServiceError::from_write(
                    e,
                    format!("An error occurred while trying to unlist Venue {venue_id}"),
                )
            })?;

        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Venue", venue_id));
        }

        log::info!("Venue unlisted (ID: {})", venue_id);
        Ok(())
    }

    async fn summarize(
        &self,
        venues: Vec<entities::venue::Model>,
        now: NaiveDateTime,
    ) -> ServiceResult<SearchResults> {
        let counts = ShowService::new(self.db.clone())
            .upcoming_counts_by_venue(now)
            .await?;

        Ok(SearchResults::new(
            venues
                .into_iter()
                .map(|venue| ListingSummary {
                    num_upcoming_shows: counts.get(&venue.id).copied().unwrap_or(0),
                    id: venue.id,
                    name: venue.name,
                })
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::artist::ArtistService;
    use crate::test_utils::{at, insert_artist, test_db, venue_input};
    use sea_orm::PaginatorTrait;

    #[tokio::test]
    async fn test_create_links_genres() {
        let db = test_db().await;
        let service = VenueService::new(db.clone());

        let venue = service
            .create(venue_input(
                "The Musical Hop",
                "San Francisco",
                "CA",
                &["Jazz", "Reggae", "Swing", "Classical", "Folk"],
            ))
            .await
            .unwrap();

        let detail = service.get(venue.id, at(2024, 1, 1, 0, 0)).await.unwrap();
        assert_eq!(
            detail.genres,
            vec!["Classical", "Folk", "Jazz", "Reggae", "Swing"]
        );
        assert_eq!(detail.counts, ShowCounts::default());
    }

    #[tokio::test]
    async fn test_create_reuses_existing_genre() {
        let db = test_db().await;
        let service = VenueService::new(db.clone());

        service
            .create(venue_input("The Musical Hop", "San Francisco", "CA", &["Jazz"]))
            .await
            .unwrap();
        service
            .create(venue_input("The Dueling Pianos Bar", "New York", "NY", &["Jazz", "Rock n Roll"]))
            .await
            .unwrap();

        let jazz_rows = entities::genre::Entity::find()
            .filter(entities::genre::Column::Name.eq("Jazz"))
            .count(&db.conn)
            .await
            .unwrap();
        assert_eq!(jazz_rows, 1);
        assert_eq!(
            entities::venue_genre::Entity::find().count(&db.conn).await.unwrap(),
            3
        );
    }

    #[tokio::test]
    async fn test_create_rejects_blank_required_field() {
        let db = test_db().await;
        let service = VenueService::new(db.clone());

        let mut input = venue_input("The Musical Hop", "San Francisco", "CA", &["Jazz"]);
        input.address = "  ".into();

        let result = service.create(input).await;
        assert!(matches!(result, Err(ServiceError::Constraint(_))));
        assert_eq!(entities::venue::Entity::find().count(&db.conn).await.unwrap(), 0);
        assert_eq!(entities::genre::Entity::find().count(&db.conn).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_by_name_is_case_insensitive() {
        let db = test_db().await;
        let service = VenueService::new(db.clone());
        service
            .create(venue_input("The Musical Hop", "San Francisco", "CA", &[]))
            .await
            .unwrap();
        service
            .create(venue_input("The Dueling Pianos Bar", "New York", "NY", &[]))
            .await
            .unwrap();
        service
            .create(venue_input("Park Square Live Music & Coffee", "San Francisco", "CA", &[]))
            .await
            .unwrap();

        let now = at(2024, 1, 1, 0, 0);
        let hop = service.search_by_name("Hop", now).await.unwrap();
        assert_eq!(hop.count, 1);
        assert_eq!(hop.items[0].name, "The Musical Hop");

        let music = service.search_by_name("music", now).await.unwrap();
        assert_eq!(music.count, 2);
        let names: Vec<&str> = music.items.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Park Square Live Music & Coffee", "The Musical Hop"]);

        let everything = service.search_by_name("", now).await.unwrap();
        assert_eq!(everything.count, 3);
    }

    #[tokio::test]
    async fn test_search_by_name_takes_wildcards_literally() {
        let db = test_db().await;
        let service = VenueService::new(db.clone());
        service
            .create(venue_input("The Musical Hop", "San Francisco", "CA", &[]))
            .await
            .unwrap();
        service
            .create(venue_input("100% Jazz", "San Francisco", "CA", &[]))
            .await
            .unwrap();

        let now = at(2024, 1, 1, 0, 0);
        let underscore = service.search_by_name("_", now).await.unwrap();
        assert_eq!(underscore.count, 0);

        let percent = service.search_by_name("%", now).await.unwrap();
        assert_eq!(percent.count, 1);
        assert_eq!(percent.items[0].name, "100% Jazz");
    }

    #[tokio::test]
    async fn test_search_by_name_folds_non_ascii_case() {
        let db = test_db().await;
        let service = VenueService::new(db.clone());
        service
            .create(venue_input("Ärzte Halle", "Berlin", "BE", &[]))
            .await
            .unwrap();

        let results = service
            .search_by_name("ärzte", at(2024, 1, 1, 0, 0))
            .await
            .unwrap();
        assert_eq!(results.count, 1);
        assert_eq!(results.items[0].name, "Ärzte Halle");
    }

    #[tokio::test]
    async fn test_search_by_city() {
        let db = test_db().await;
        let service = VenueService::new(db.clone());
        service
            .create(venue_input("The Musical Hop", "San Francisco", "CA", &[]))
            .await
            .unwrap();
        service
            .create(venue_input("The Dueling Pianos Bar", "New York", "NY", &[]))
            .await
            .unwrap();

        let results = service
            .search_by_city("New York", "NY", at(2024, 1, 1, 0, 0))
            .await
            .unwrap();
        assert_eq!(results.count, 1);
        assert_eq!(results.items[0].name, "The Dueling Pianos Bar");
    }

    #[tokio::test]
    async fn test_list_by_area_groups_and_counts() {
        let db = test_db().await;
        let service = VenueService::new(db.clone());
        let hop = service
            .create(venue_input("The Musical Hop", "San Francisco", "CA", &[]))
            .await
            .unwrap();
        service
            .create(venue_input("Park Square Live Music & Coffee", "San Francisco", "CA", &[]))
            .await
            .unwrap();
        service
            .create(venue_input("The Dueling Pianos Bar", "New York", "NY", &[]))
            .await
            .unwrap();

        let artist_id = insert_artist(&db, "Guns N Petals").await;
        ShowService::new(db.clone())
            .create(artist_id, hop.id, at(2035, 1, 1, 20, 0))
            .await
            .unwrap();

        let areas = service.list_by_area(at(2024, 1, 1, 0, 0)).await.unwrap();
        assert_eq!(areas.len(), 2);
        assert_eq!((areas[0].city.as_str(), areas[0].state.as_str()), ("San Francisco", "CA"));
        assert_eq!((areas[1].city.as_str(), areas[1].state.as_str()), ("New York", "NY"));
        assert_eq!(areas[0].venues.len(), 2);

        let hop_summary = areas[0]
            .venues
            .iter()
            .find(|v| v.id == hop.id)
            .unwrap();
        assert_eq!(hop_summary.num_upcoming_shows, 1);
    }

    #[tokio::test]
    async fn test_update_replaces_fields_and_genres() {
        let db = test_db().await;
        let service = VenueService::new(db.clone());
        let venue = service
            .create(venue_input("The Musical Hop", "San Francisco", "CA", &["Jazz", "Swing"]))
            .await
            .unwrap();

        let mut input = venue_input("The Musical Hop Annex", "Oakland", "CA", &["Folk"]);
        input.seeking_talent = true;
        input.seeking_description = Some("We are on the lookout for a local artist".into());
        let updated = service.update(venue.id, input).await.unwrap();

        assert_eq!(updated.name, "The Musical Hop Annex");
        assert_eq!(updated.city, "Oakland");
        assert!(updated.seeking_talent);

        let detail = service.get(venue.id, at(2024, 1, 1, 0, 0)).await.unwrap();
        assert_eq!(detail.genres, vec!["Folk"]);
    }

    #[tokio::test]
    async fn test_update_missing_venue() {
        let db = test_db().await;
        let service = VenueService::new(db.clone());

        let result = service
            .update(7, venue_input("Nowhere", "San Francisco", "CA", &[]))
            .await;
        assert!(matches!(
            result,
            Err(ServiceError::NotFound { entity: "Venue", id: 7 })
        ));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_shows() {
        let db = test_db().await;
        let service = VenueService::new(db.clone());
        let venue = service
            .create(venue_input("The Musical Hop", "San Francisco", "CA", &["Jazz"]))
            .await
            .unwrap();
        let artist_id = insert_artist(&db, "Guns N Petals").await;
        let shows = ShowService::new(db.clone());
        shows.create(artist_id, venue.id, at(2019, 5, 21, 21, 30)).await.unwrap();
        shows.create(artist_id, venue.id, at(2035, 4, 1, 20, 0)).await.unwrap();

        service.delete(venue.id).await.unwrap();

        assert_eq!(entities::show::Entity::find().count(&db.conn).await.unwrap(), 0);
        assert_eq!(
            entities::venue_genre::Entity::find().count(&db.conn).await.unwrap(),
            0
        );
        // Genres are shared reference data and survive
        assert_eq!(entities::genre::Entity::find().count(&db.conn).await.unwrap(), 1);
        // The artist is untouched
        assert!(
            ArtistService::new(db.clone())
                .get(artist_id, at(2024, 1, 1, 0, 0))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_delete_missing_venue() {
        let db = test_db().await;
        let service = VenueService::new(db.clone());

        tokio_test::assert_err!(service.delete(1).await);
    }

    #[tokio::test]
    async fn test_recent_orders_newest_first() {
        let db = test_db().await;
        let service = VenueService::new(db.clone());
        for name in ["First", "Second", "Third"] {
            service
                .create(venue_input(name, "San Francisco", "CA", &[]))
                .await
                .unwrap();
        }

        let recent = service.recent(2).await.unwrap();
        let names: Vec<&str> = recent.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Third", "Second"]);
    }
}
