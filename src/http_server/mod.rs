pub mod app;
pub mod graphql;
pub mod graphql_error;
pub mod state;
