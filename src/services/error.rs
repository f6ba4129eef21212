use sea_orm::{DbErr, SqlErr};

/// Failure of a directory operation. Every variant is terminal for the request
/// that produced it; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    /// A write was refused: a unique or foreign key constraint fired, or the
    /// input was missing a required value. Nothing was persisted.
    #[error("{0}")]
    Constraint(String),
    #[error("Artist {artist} will not be available for the show")]
    ArtistUnavailable { artist: String },
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Classify a failed write. Constraint violations become a user-facing
    /// `Constraint` with the given message, anything else stays a database
    /// error.
    pub fn from_write(err: DbErr, message: impl Into<String>) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail))
            | Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                log::debug!("Constraint violation: {}", detail);
                Self::Constraint(message.into())
            }
            _ => Self::Database(err),
        }
    }
}
