pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20240118_000001_urls_table;
mod m20240205_000001_urls_user_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240118_000001_urls_table::Migration),
            Box::new(m20240205_000001_urls_user_index::Migration),
        ]
    }
}
