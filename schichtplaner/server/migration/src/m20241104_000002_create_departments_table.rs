use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const IDX_DEPARTMENTS_DELETED_AT: &str = "idx_departments_deleted_at";
const UQ_DEPARTMENTS_NAME: &str = "uq_departments_name_live";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Departments::Table)
                    .if_not_exists()
                    .col(pk_auto(Departments::Id))
                    .col(timestamp_with_time_zone(Departments::CreatedAt))
                    .col(timestamp_with_time_zone(Departments::UpdatedAt))
                    .col(timestamp_with_time_zone_null(Departments::DeletedAt))
                    .col(string(Departments::Name))
                    .col(string(Departments::Description).default(""))
                    .col(string(Departments::Color).default(""))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_DEPARTMENTS_DELETED_AT)
                    .table(Departments::Table)
                    .col(Departments::DeletedAt)
                    .to_owned(),
            )
            .await?;

        // Names only have to be unique among rows that are not soft-deleted.
        manager
            .get_connection()
            .execute_unprepared(&format!(
                "CREATE UNIQUE INDEX {UQ_DEPARTMENTS_NAME} ON departments (name) WHERE deleted_at IS NULL"
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(UQ_DEPARTMENTS_NAME)
                    .table(Departments::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_DEPARTMENTS_DELETED_AT)
                    .table(Departments::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Departments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    Id,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
    Name,
    Description,
    Color,
}
