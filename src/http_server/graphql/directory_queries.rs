use async_graphql::{Context, Object, SimpleObject};
use chrono::{DateTime, Utc};

use crate::http_server::graphql::context::get_app_state;
use crate::http_server::graphql_error::GraphqlResult;
use crate::services::artist::ArtistService;
use crate::services::genre::GenreService;
use crate::services::search::{ListingSummary, SearchResults};
use crate::services::venue::VenueService;

/// A venue or artist in a listing, with the number of shows still to come.
#[derive(Debug, Clone, SimpleObject)]
pub struct Listing {
    pub id: i64,
    pub name: String,
    pub num_upcoming_shows: i64,
}

impl From<ListingSummary> for Listing {
    fn from(summary: ListingSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
            num_upcoming_shows: summary.num_upcoming_shows as i64,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct SearchResponse {
    pub count: i64,
    pub data: Vec<Listing>,
}

impl From<SearchResults> for SearchResponse {
    fn from(results: SearchResults) -> Self {
        Self {
            count: results.count as i64,
            data: results.items.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct RecentListing {
    pub id: i64,
    pub name: String,
    pub image_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct Home {
    pub recent_venues: Vec<RecentListing>,
    pub recent_artists: Vec<RecentListing>,
}

#[derive(Default)]
pub struct DirectoryQuery;

#[Object]
impl DirectoryQuery {
    /// Newest venues and artists, for the landing page.
    async fn home(&self, ctx: &Context<'_>) -> GraphqlResult<Home> {
        let app_state = get_app_state(ctx)?;
        let limit = app_state.recent_listings;

        let recent_venues = VenueService::new(app_state.db.clone())
            .recent(limit)
            .await?
            .into_iter()
            .map(|venue| RecentListing {
                id: venue.id,
                name: venue.name,
                image_link: venue.image_link,
                created_at: venue.created_at,
            })
            .collect();

        let recent_artists = ArtistService::new(app_state.db.clone())
            .recent(limit)
            .await?
            .into_iter()
            .map(|artist| RecentListing {
                id: artist.id,
                name: artist.name,
                image_link: artist.image_link,
                created_at: artist.created_at,
            })
            .collect();

        Ok(Home {
            recent_venues,
            recent_artists,
        })
    }

    async fn genres(&self, ctx: &Context<'_>) -> GraphqlResult<Vec<String>> {
        let app_state = get_app_state(ctx)?;
        let genres = GenreService::new(app_state.db.clone()).list().await?;
        Ok(genres.into_iter().map(|g| g.name).collect())
    }
}
