use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Shows cascade with their venue but not with their artist.
        manager
            .create_table(
                Table::create()
                    .table("shows")
                    .if_not_exists()
                    .col(
                        ColumnDef::new("id")
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new("artist_id").integer().not_null())
                    .col(ColumnDef::new("venue_id").integer().not_null())
                    .col(ColumnDef::new("start_time").date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shows_artist_id")
                            .from("shows", "artist_id")
                            .to("artists", "id")
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shows_venue_id")
                            .from("shows", "venue_id")
                            .to("venues", "id")
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table("venue_genre")
                    .if_not_exists()
                    .col(ColumnDef::new("venue_id").integer().not_null())
                    .col(ColumnDef::new("genre_id").integer().not_null())
                    .primary_key(Index::create().col("venue_id").col("genre_id"))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_venue_genre_venue_id")
                            .from("venue_genre", "venue_id")
                            .to("venues", "id")
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_venue_genre_genre_id")
                            .from("venue_genre", "genre_id")
                            .to("genres", "id")
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table("artist_genre")
                    .if_not_exists()
                    .col(ColumnDef::new("artist_id").integer().not_null())
                    .col(ColumnDef::new("genre_id").integer().not_null())
                    .primary_key(Index::create().col("artist_id").col("genre_id"))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_artist_genre_artist_id")
                            .from("artist_genre", "artist_id")
                            .to("artists", "id")
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_artist_genre_genre_id")
                            .from("artist_genre", "genre_id")
                            .to("genres", "id")
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_shows_venue_id_start_time")
                    .table("shows")
                    .col("venue_id")
                    .col("start_time")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_shows_artist_id_start_time")
                    .table("shows")
                    .col("artist_id")
                    .col("start_time")
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order
        manager
            .drop_table(Table::drop().table("artist_genre").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table("venue_genre").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table("shows").to_owned())
            .await?;

        Ok(())
    }
}
