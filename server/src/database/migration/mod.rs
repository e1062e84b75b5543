//! Schema migrations.

use sea_orm_migration::prelude::*;

mod m20260312_000001_create_project_table;
mod m20260315_000001_create_artboard_chunk_table;
mod m20260330_000001_add_publish_columns;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260312_000001_create_project_table::Migration),
            Box::new(m20260315_000001_create_artboard_chunk_table::Migration),
            Box::new(m20260330_000001_add_publish_columns::Migration),
        ]
    }
}
