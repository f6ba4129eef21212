use async_graphql::{Context, Object, SimpleObject};
use chrono::{NaiveDateTime, NaiveTime};

use crate::http_server::graphql::context::get_app_state;
use crate::http_server::graphql::directory_queries::{Listing, SearchResponse};
use crate::http_server::graphql_error::GraphqlResult;
use crate::services::artist::{ArtistDetail, ArtistService};
use crate::services::show::ArtistShow;

#[derive(Debug, Clone, SimpleObject)]
pub struct ArtistShowEntry {
    pub show_id: i64,
    pub venue_id: i64,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub start_time: NaiveDateTime,
}

impl From<ArtistShow> for ArtistShowEntry {
    fn from(show: ArtistShow) -> Self {
        Self {
            show_id: show.show_id,
            venue_id: show.venue_id,
            venue_name: show.venue_name,
            venue_image_link: show.venue_image_link,
            start_time: show.start_time,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    pub genres: Vec<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub website_link: Option<String>,
    pub facebook_link: Option<String>,
    pub image_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub time_available_from: NaiveTime,
    pub time_available_to: NaiveTime,
    pub past_shows: Vec<ArtistShowEntry>,
    pub upcoming_shows: Vec<ArtistShowEntry>,
    pub past_shows_count: i64,
    pub upcoming_shows_count: i64,
}

impl From<ArtistDetail> for Artist {
    fn from(detail: ArtistDetail) -> Self {
        let artist = detail.artist;
        Self {
            id: artist.id,
            name: artist.name,
            genres: detail.genres,
            city: artist.city,
            state: artist.state,
            phone: artist.phone,
            website_link: artist.website_link,
            facebook_link: artist.facebook_link,
            image_link: artist.image_link,
            seeking_venue: artist.seeking_venue,
            seeking_description: artist.seeking_description,
            time_available_from: artist.time_available_from,
            time_available_to: artist.time_available_to,
            past_shows: detail.past_shows.into_iter().map(Into::into).collect(),
            upcoming_shows: detail.upcoming_shows.into_iter().map(Into::into).collect(),
            past_shows_count: detail.counts.past as i64,
            upcoming_shows_count: detail.counts.upcoming as i64,
        }
    }
}

#[derive(Default)]
pub struct ArtistQuery;

#[Object]
impl ArtistQuery {
    async fn artists(&self, ctx: &Context<'_>) -> GraphqlResult<Vec<Listing>> {
        let app_state = get_app_state(ctx)?;
        let service = ArtistService::new(app_state.db.clone());
        let artists = service.list(app_state.clock.now()).await?;
        Ok(artists.into_iter().map(Into::into).collect())
    }

    async fn artist(&self, ctx: &Context<'_>, id: i64) -> GraphqlResult<Artist> {
        let app_state = get_app_state(ctx)?;
        let service = ArtistService::new(app_state.db.clone());
        let detail = service.get(id, app_state.clock.now()).await?;
        Ok(detail.into())
    }

    async fn search_artists(
        &self,
        ctx: &Context<'_>,
        search_term: String,
    ) -> GraphqlResult<SearchResponse> {
        let app_state = get_app_state(ctx)?;
        let service = ArtistService::new(app_state.db.clone());
        let results = service
            .search_by_name(&search_term, app_state.clock.now())
            .await?;
        Ok(results.into())
    }

    async fn search_artists_by_city(
        &self,
        ctx: &Context<'_>,
        city: String,
        state: String,
    ) -> GraphqlResult<SearchResponse> {
        let app_state = get_app_state(ctx)?;
        let service = ArtistService::new(app_state.db.clone());
        let results = service
            .search_by_city(&city, &state, app_state.clock.now())
            .await?;
        Ok(results.into())
    }
}
