use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shows::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Shows::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Shows::Name).string().not_null())
                    .col(ColumnDef::new(Shows::Network).string().not_null())
                    .col(ColumnDef::new(Shows::Artist).string().not_null())
                    .col(ColumnDef::new(Shows::PremiereYear).integer().not_null())
                    .col(ColumnDef::new(Shows::VideoUrl).string())
                    .to_owned(),
            )
            .await?;

        // Timeline seeding pulls distinct premiere years
        manager
            .create_index(
                Index::create()
                    .name("idx_shows_premiere_year")
                    .table(Shows::Table)
                    .col(Shows::PremiereYear)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Shows::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Shows {
    Table,
    Id,
    Name,
    Network,
    Artist,
    PremiereYear,
    VideoUrl,
}
