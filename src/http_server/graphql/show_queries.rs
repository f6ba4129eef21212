use async_graphql::{Context, Object, SimpleObject};
use chrono::NaiveDateTime;

use crate::http_server::graphql::context::get_app_state;
use crate::http_server::graphql_error::GraphqlResult;
use crate::services::show::{ShowListing, ShowService};

#[derive(Debug, Clone, SimpleObject)]
pub struct Show {
    pub id: i64,
    pub venue_id: i64,
    pub venue_name: String,
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: NaiveDateTime,
}

impl From<ShowListing> for Show {
    fn from(listing: ShowListing) -> Self {
        Self {
            id: listing.show_id,
            venue_id: listing.venue_id,
            venue_name: listing.venue_name,
            artist_id: listing.artist_id,
            artist_name: listing.artist_name,
            artist_image_link: listing.artist_image_link,
            start_time: listing.start_time,
        }
    }
}

#[derive(Default)]
pub struct ShowQuery;

#[Object]
impl ShowQuery {
    async fn shows(&self, ctx: &Context<'_>) -> GraphqlResult<Vec<Show>> {
        let db = &get_app_state(ctx)?.db;
        let shows = ShowService::new(db.clone()).list().await?;
        Ok(shows.into_iter().map(Into::into).collect())
    }
}
