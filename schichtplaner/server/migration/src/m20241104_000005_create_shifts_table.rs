use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const IDX_SHIFTS_DELETED_AT: &str = "idx_shifts_deleted_at";
const IDX_SHIFTS_USER_ID: &str = "idx_shifts_user_id";
const FK_SHIFTS_TO_USERS: &str = "fk-shifts-user_id";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shifts::Table)
                    .if_not_exists()
                    .col(pk_auto(Shifts::Id))
                    .col(timestamp_with_time_zone(Shifts::CreatedAt))
                    .col(timestamp_with_time_zone(Shifts::UpdatedAt))
                    .col(timestamp_with_time_zone_null(Shifts::DeletedAt))
                    .col(timestamp_with_time_zone(Shifts::StartTime))
                    .col(timestamp_with_time_zone(Shifts::EndTime))
                    .col(string(Shifts::Description).default(""))
                    .col(integer(Shifts::UserId))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_SHIFTS_TO_USERS)
                            .from(Shifts::Table, Shifts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_SHIFTS_DELETED_AT)
                    .table(Shifts::Table)
                    .col(Shifts::DeletedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_SHIFTS_USER_ID)
                    .table(Shifts::Table)
                    .col(Shifts::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Shifts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Shifts {
    Table,
    Id,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
    StartTime,
    EndTime,
    Description,
    UserId,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
