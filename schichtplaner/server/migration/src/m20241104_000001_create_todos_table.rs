use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const IDX_TODOS_DELETED_AT: &str = "idx_todos_deleted_at";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Todos::Table)
                    .if_not_exists()
                    .col(pk_auto(Todos::Id))
                    .col(timestamp_with_time_zone(Todos::CreatedAt))
                    .col(timestamp_with_time_zone(Todos::UpdatedAt))
                    .col(timestamp_with_time_zone_null(Todos::DeletedAt))
                    .col(string(Todos::Title))
                    .col(boolean(Todos::Completed).default(false))
                    .col(string(Todos::Description).default(""))
                    .col(string(Todos::Date).default(""))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_TODOS_DELETED_AT)
                    .table(Todos::Table)
                    .col(Todos::DeletedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_TODOS_DELETED_AT)
                    .table(Todos::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Todos::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Todos {
    Table,
    Id,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
    Title,
    Completed,
    Description,
    Date,
}
