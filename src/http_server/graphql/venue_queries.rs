use async_graphql::{Context, Object, SimpleObject};
use chrono::NaiveDateTime;

use crate::http_server::graphql::context::get_app_state;
use crate::http_server::graphql::directory_queries::{Listing, SearchResponse};
use crate::http_server::graphql_error::GraphqlResult;
use crate::services::show::VenueShow;
use crate::services::venue::{self, VenueDetail, VenueService};

#[derive(Debug, Clone, SimpleObject)]
pub struct VenueShowEntry {
    pub show_id: i64,
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: NaiveDateTime,
}

impl From<VenueShow> for VenueShowEntry {
    fn from(show: VenueShow) -> Self {
        Self {
            show_id: show.show_id,
            artist_id: show.artist_id,
            artist_name: show.artist_name,
            artist_image_link: show.artist_image_link,
            start_time: show.start_time,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct Venue {
    pub id: i64,
    pub name: String,
    pub genres: Vec<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website_link: Option<String>,
    pub facebook_link: Option<String>,
    pub image_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub past_shows: Vec<VenueShowEntry>,
    pub upcoming_shows: Vec<VenueShowEntry>,
    pub past_shows_count: i64,
    pub upcoming_shows_count: i64,
}

impl From<VenueDetail> for Venue {
    fn from(detail: VenueDetail) -> Self {
        let venue = detail.venue;
        Self {
            id: venue.id,
            name: venue.name,
            genres: detail.genres,
            address: venue.address,
            city: venue.city,
            state: venue.state,
            phone: venue.phone,
            website_link: venue.website_link,
            facebook_link: venue.facebook_link,
            image_link: venue.image_link,
            seeking_talent: venue.seeking_talent,
            seeking_description: venue.seeking_description,
            past_shows: detail.past_shows.into_iter().map(Into::into).collect(),
            upcoming_shows: detail.upcoming_shows.into_iter().map(Into::into).collect(),
            past_shows_count: detail.counts.past as i64,
            upcoming_shows_count: detail.counts.upcoming as i64,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct VenueArea {
    pub city: String,
    pub state: String,
    pub venues: Vec<Listing>,
}

impl From<venue::VenueArea> for VenueArea {
    fn from(area: venue::VenueArea) -> Self {
        Self {
            city: area.city,
            state: area.state,
            venues: area.venues.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Default)]
pub struct VenueQuery;

#[Object]
impl VenueQuery {
    /// Every venue, grouped by city and state.
    async fn venues(&self, ctx: &Context<'_>) -> GraphqlResult<Vec<VenueArea>> {
        let app_state = get_app_state(ctx)?;
        let service = VenueService::new(app_state.db.clone());
        let areas = service.list_by_area(app_state.clock.now()).await?;
        Ok(areas.into_iter().map(Into::into).collect())
    }

    async fn venue(&self, ctx: &Context<'_>, id: i64) -> GraphqlResult<Venue> {
        let app_state = get_app_state(ctx)?;
        let service = VenueService::new(app_state.db.clone());
        let detail = service.get(id, app_state.clock.now()).await?;
        Ok(detail.into())
    }

    /// Case-insensitive substring match on the venue name.
    async fn search_venues(
        &self,
        ctx: &Context<'_>,
        search_term: String,
    ) -> GraphqlResult<SearchResponse> {
        let app_state = get_app_state(ctx)?;
        let service = VenueService::new(app_state.db.clone());
        let results = service
            .search_by_name(&search_term, app_state.clock.now())
            .await?;
        Ok(results.into())
    }

    async fn search_venues_by_city(
        &self,
        ctx: &Context<'_>,
        city: String,
        state: String,
    ) -> GraphqlResult<SearchResponse> {
        let app_state = get_app_state(ctx)?;
        let service = VenueService::new(app_state.db.clone());
        let results = service
            .search_by_city(&city, &state, app_state.clock.now())
            .await?;
        Ok(results.into())
    }
}
