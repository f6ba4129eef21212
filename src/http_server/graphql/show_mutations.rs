use async_graphql::{Context, InputObject, Object};
use chrono::NaiveDateTime;

use crate::http_server::graphql::context::get_app_state;
use crate::http_server::graphql::show_queries::Show;
use crate::http_server::graphql_error::{GraphqlError, GraphqlResult};
use crate::services::show::ShowService;

#[derive(Debug, Clone, InputObject)]
pub struct ShowInput {
    pub artist_id: i64,
    pub venue_id: i64,
    /// Local start time, `YYYY-MM-DDTHH:MM:SS` (a space separator is accepted too).
    pub start_time: String,
}

fn parse_start_time(value: &str) -> Result<NaiveDateTime, GraphqlError> {
    let value = value.trim();
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| {
            GraphqlError::ConstraintViolation(format!("Start time '{value}' is not a valid date and time"))
        })
}

#[derive(Default)]
pub struct ShowMutation;

#[Object]
impl ShowMutation {
    /// Book an artist at a venue. Rejected with ARTIST_UNAVAILABLE when the
    /// start time is outside the artist's availability window.
    async fn create_show(&self, ctx: &Context<'_>, input: ShowInput) -> GraphqlResult<Show> {
        let db = &get_app_state(ctx)?.db;
        let start_time = parse_start_time(&input.start_time)?;

        let service = ShowService::new(db.clone());
        let show = service
            .create(input.artist_id, input.venue_id, start_time)
            .await?;
        Ok(service.get(show.id).await?.into())
    }
}
