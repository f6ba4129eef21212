use async_graphql::{Error, ErrorExtensions};

use crate::services::error::ServiceError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum GraphqlError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    ConstraintViolation(String),
    #[error("{0}")]
    ArtistUnavailable(String),
    #[error("Server error: {0}")]
    ServerError(String),
    #[error("Failed to get app state")]
    FailedToGetAppState,
}

impl GraphqlError {
    pub fn code(&self) -> &'static str {
        match self {
            GraphqlError::NotFound(_) => "NOT_FOUND",
            GraphqlError::ConstraintViolation(_) => "CONSTRAINT_VIOLATION",
            GraphqlError::ArtistUnavailable(_) => "ARTIST_UNAVAILABLE",
            GraphqlError::ServerError(_) | GraphqlError::FailedToGetAppState => "SERVER_ERROR",
        }
    }
}

impl Default for GraphqlError {
    fn default() -> Self {
        Self::ServerError("Unknown error".to_string())
    }
}

impl From<ServiceError> for GraphqlError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound { .. } => Self::NotFound(err.to_string()),
            ServiceError::Constraint(message) => Self::ConstraintViolation(message),
            ServiceError::ArtistUnavailable { .. } => Self::ArtistUnavailable(err.to_string()),
            ServiceError::Database(db_err) => {
                log::error!("GraphQL error: {:#?}", db_err);
                Self::ServerError(db_err.to_string())
            }
        }
    }
}

impl ErrorExtensions for GraphqlError {
    fn extend(&self) -> Error {
        Error::new(format!("{}", self)).extend_with(|_err, e| {
            e.set("code", self.code().to_string());
            match self {
                GraphqlError::ServerError(reason) => e.set("reason", reason.clone()),
                GraphqlError::FailedToGetAppState => {
                    e.set("reason", "Failed to get app state".to_string())
                }
                _ => {}
            }
        })
    }
}

// Newtype wrapper to avoid blanket From implementation conflict for GraphqlError and async_graphql::Error
#[derive(Debug, Clone)]
pub struct GraphqlErrorWrapper(GraphqlError);

impl From<GraphqlError> for GraphqlErrorWrapper {
    fn from(err: GraphqlError) -> Self {
        Self(err)
    }
}

impl From<GraphqlErrorWrapper> for Error {
    fn from(wrapper: GraphqlErrorWrapper) -> Self {
        wrapper.0.extend()
    }
}

impl From<ServiceError> for GraphqlErrorWrapper {
    fn from(err: ServiceError) -> Self {
        GraphqlError::from(err).into()
    }
}

pub type GraphqlResult<T> = Result<T, GraphqlErrorWrapper>;
