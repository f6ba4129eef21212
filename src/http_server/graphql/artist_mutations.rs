use async_graphql::{Context, InputObject, Object};
use chrono::NaiveTime;

use crate::http_server::graphql::artist_queries::Artist;
use crate::http_server::graphql::context::get_app_state;
use crate::http_server::graphql_error::GraphqlResult;
use crate::services::artist::{self, ArtistService};

#[derive(Debug, Clone, InputObject)]
pub struct ArtistInput {
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: Option<String>,
    #[graphql(default)]
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub time_available_from: NaiveTime,
    pub time_available_to: NaiveTime,
    #[graphql(default)]
    pub genres: Vec<String>,
}

impl From<ArtistInput> for artist::ArtistInput {
    fn from(input: ArtistInput) -> Self {
        Self {
            name: input.name,
            city: input.city,
            state: input.state,
            phone: input.phone,
            image_link: input.image_link,
            facebook_link: input.facebook_link,
            website_link: input.website_link,
            seeking_venue: input.seeking_venue,
            seeking_description: input.seeking_description,
            time_available_from: input.time_available_from,
            time_available_to: input.time_available_to,
            genres: input.genres,
        }
    }
}

#[derive(Default)]
pub struct ArtistMutation;

#[Object]
impl ArtistMutation {
    async fn create_artist(&self, ctx: &Context<'_>, input: ArtistInput) -> GraphqlResult<Artist> {
        let app_state = get_app_state(ctx)?;
        let service = ArtistService::new(app_state.db.clone());
        let model = service.create(input.into()).await?;
        let detail = service.get(model.id, app_state.clock.now()).await?;
        Ok(detail.into())
    }

    async fn update_artist(
        &self,
        ctx: &Context<'_>,
        id: i64,
        input: ArtistInput,
    ) -> GraphqlResult<Artist> {
        let app_state = get_app_state(ctx)?;
        let service = ArtistService::new(app_state.db.clone());
        service.update(id, input.into()).await?;
        let detail = service.get(id, app_state.clock.now()).await?;
        Ok(detail.into())
    }

    /// Fails with CONSTRAINT_VIOLATION while the artist still has shows.
    async fn delete_artist(&self, ctx: &Context<'_>, id: i64) -> GraphqlResult<bool> {
        let db = &get_app_state(ctx)?.db;
        ArtistService::new(db.clone()).delete(id).await?;
        Ok(true)
    }
}
