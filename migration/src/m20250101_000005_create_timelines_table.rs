use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Timelines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Timelines::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Timelines::PlayerId).string().not_null())
                    .col(ColumnDef::new(Timelines::Year).integer().not_null())
                    .col(
                        ColumnDef::new(Timelines::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Scores are row counts per player
        manager
            .create_index(
                Index::create()
                    .name("idx_timelines_player_id")
                    .table(Timelines::Table)
                    .col(Timelines::PlayerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Timelines::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Timelines {
    Table,
    Id,
    PlayerId,
    Year,
    CreatedAt,
}
