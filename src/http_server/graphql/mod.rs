use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql::{EmptySubscription, MergedObject, Schema};
use axum::response::{Html, IntoResponse};

use crate::http_server::state::AppState;

pub mod artist_mutations;
pub mod artist_queries;
mod context;
pub mod directory_queries;
pub mod show_mutations;
pub mod show_queries;
pub mod venue_mutations;
pub mod venue_queries;

use artist_mutations::ArtistMutation;
use artist_queries::ArtistQuery;
use directory_queries::DirectoryQuery;
use show_mutations::ShowMutation;
use show_queries::ShowQuery;
use venue_mutations::VenueMutation;
use venue_queries::VenueQuery;

#[derive(Default, MergedObject)]
pub struct Query(DirectoryQuery, VenueQuery, ArtistQuery, ShowQuery);

#[derive(Default, MergedObject)]
pub struct Mutation(VenueMutation, ArtistMutation, ShowMutation);

pub type FyyurSchema = Schema<Query, Mutation, EmptySubscription>;

pub async fn graphql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

pub fn create_schema(app_state: Arc<AppState>) -> FyyurSchema {
    Schema::build(Query::default(), Mutation::default(), EmptySubscription)
        .data(app_state)
        .finish()
}
