use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Attempts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Attempts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Attempts::LobbyId).string().not_null())
                    .col(ColumnDef::new(Attempts::RoundNumber).integer().not_null())
                    .col(ColumnDef::new(Attempts::PlayerId).string().not_null())
                    .col(ColumnDef::new(Attempts::AttemptOrder).integer().not_null())
                    .col(ColumnDef::new(Attempts::GuessType).string().not_null())
                    .col(ColumnDef::new(Attempts::XYear).integer().not_null())
                    .col(ColumnDef::new(Attempts::YYear).integer())
                    .col(ColumnDef::new(Attempts::IsCorrect).boolean().not_null())
                    .col(
                        ColumnDef::new(Attempts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Attempt ordering is per lobby+round
        manager
            .create_index(
                Index::create()
                    .name("idx_attempts_lobby_round")
                    .table(Attempts::Table)
                    .col(Attempts::LobbyId)
                    .col(Attempts::RoundNumber)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Attempts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Attempts {
    Table,
    Id,
    LobbyId,
    RoundNumber,
    PlayerId,
    AttemptOrder,
    GuessType,
    XYear,
    YYear,
    IsCorrect,
    CreatedAt,
}
