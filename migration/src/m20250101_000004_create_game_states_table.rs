use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GameStates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GameStates::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    // One aggregate per lobby
                    .col(
                        ColumnDef::new(GameStates::LobbyId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(GameStates::RoundNumber)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(GameStates::CurrentGuesserSeat)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GameStates::CurrentDjSeat)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GameStates::CurrentAttemptSeat)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GameStates::ShowId).string())
                    .col(
                        ColumnDef::new(GameStates::RoundState)
                            .string()
                            .not_null()
                            .default("dj_ready"),
                    )
                    // Optimistic concurrency guard; bumped on every update
                    .col(
                        ColumnDef::new(GameStates::Revision)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(GameStates::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GameStates::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum GameStates {
    Table,
    Id,
    LobbyId,
    RoundNumber,
    CurrentGuesserSeat,
    CurrentDjSeat,
    CurrentAttemptSeat,
    ShowId,
    RoundState,
    Revision,
    UpdatedAt,
}
