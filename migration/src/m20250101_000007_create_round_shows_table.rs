use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RoundShows::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RoundShows::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RoundShows::LobbyId).string().not_null())
                    .col(
                        ColumnDef::new(RoundShows::RoundNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RoundShows::ShowId).string().not_null())
                    .col(
                        ColumnDef::new(RoundShows::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // One show per round; the exclusion set for later show picks
        manager
            .create_index(
                Index::create()
                    .name("idx_round_shows_lobby_round")
                    .table(RoundShows::Table)
                    .col(RoundShows::LobbyId)
                    .col(RoundShows::RoundNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RoundShows::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum RoundShows {
    Table,
    Id,
    LobbyId,
    RoundNumber,
    ShowId,
    CreatedAt,
}
