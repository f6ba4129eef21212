use color_eyre::{Result, eyre::Context};
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection};
use std::path::Path;
use std::time::Duration;

/// Pooled handle to the directory's SQLite store.
///
/// There is no global session: the handle is created once at startup, wrapped
/// in an `Arc` and handed to every service that needs it.
pub struct Database {
    pub conn: DatabaseConnection,
}

impl Database {
    /// Open or create a database at the given path
    pub async fn open(path: &Path) -> Result<Self> {
        log::debug!("Opening database at: {}", path.display());

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).context(format!(
                "Failed to create database directory: {}",
                parent.display()
            ))?;
        }

        // Create SQLite connection URL
        let url = format!("sqlite://{}?mode=rwc", path.display());

        // Configure connection options
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(16)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(8))
            .acquire_timeout(Duration::from_secs(8))
            .idle_timeout(Duration::from_secs(60))
            .sqlx_logging(false);

        let database = Self::connect(opt)
            .await
            .context(format!("Failed to open database: {}", path.display()))?;

        log::info!("Database ready at: {}", path.display());
        Ok(database)
    }

    /// Connect with the given options and bring the schema up to date.
    ///
    /// sqlx turns `foreign_keys` on for every SQLite connection it opens, which
    /// the venue cascade and the artist restriction on `shows` depend on.
    pub async fn connect(options: ConnectOptions) -> Result<Self> {
        let conn = SeaDatabase::connect(options)
            .await
            .context("Failed to connect to database")?;

        log::debug!("Running database migrations");
        migration::Migrator::up(&conn, None)
            .await
            .context("Failed to run database migrations")?;

        Ok(Database { conn })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities;
    use sea_orm::{EntityTrait, PaginatorTrait};

    #[tokio::test]
    async fn test_open_creates_file_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("fyyur.sqlite");

        let database = Database::open(&path).await.unwrap();
        assert!(path.exists());

        // Every table is queryable once migrations have run
        assert_eq!(entities::venue::Entity::find().count(&database.conn).await.unwrap(), 0);
        assert_eq!(entities::artist::Entity::find().count(&database.conn).await.unwrap(), 0);
        assert_eq!(entities::genre::Entity::find().count(&database.conn).await.unwrap(), 0);
        assert_eq!(entities::show::Entity::find().count(&database.conn).await.unwrap(), 0);
        assert_eq!(
            entities::venue_genre::Entity::find().count(&database.conn).await.unwrap(),
            0
        );
        assert_eq!(
            entities::artist_genre::Entity::find().count(&database.conn).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fyyur.sqlite");

        drop(Database::open(&path).await.unwrap());
        tokio_test::assert_ok!(Database::open(&path).await);
    }
}
