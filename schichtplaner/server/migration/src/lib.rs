pub use sea_orm_migration::prelude::*;

mod m20241104_000001_create_todos_table;
mod m20241104_000002_create_departments_table;
mod m20241104_000003_create_users_table;
mod m20241104_000004_create_user_departments_table;
mod m20241104_000005_create_shifts_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241104_000001_create_todos_table::Migration),
            Box::new(m20241104_000002_create_departments_table::Migration),
            Box::new(m20241104_000003_create_users_table::Migration),
            Box::new(m20241104_000004_create_user_departments_table::Migration),
            Box::new(m20241104_000005_create_shifts_table::Migration),
        ]
    }
}
