use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const PK_USER_DEPARTMENTS: &str = "pk-user_departments";
const FK_USER_DEPARTMENTS_TO_USERS: &str = "fk-user_departments-user_id";
const FK_USER_DEPARTMENTS_TO_DEPARTMENTS: &str = "fk-user_departments-department_id";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserDepartments::Table)
                    .if_not_exists()
                    .col(integer(UserDepartments::UserId))
                    .col(integer(UserDepartments::DepartmentId))
                    .primary_key(
                        Index::create()
                            .name(PK_USER_DEPARTMENTS)
                            .table(UserDepartments::Table)
                            .col(UserDepartments::UserId)
                            .col(UserDepartments::DepartmentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_USER_DEPARTMENTS_TO_USERS)
                            .from(UserDepartments::Table, UserDepartments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_USER_DEPARTMENTS_TO_DEPARTMENTS)
                            .from(UserDepartments::Table, UserDepartments::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserDepartments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserDepartments {
    Table,
    UserId,
    DepartmentId,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    Id,
}
