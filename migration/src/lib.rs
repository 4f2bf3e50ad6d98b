//! Database migrations for the directory service.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2025_01_10_000001_create_reference_tables;
mod m2025_01_10_000002_create_organizations;
mod m2025_01_10_000003_create_organization_submissions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_01_10_000001_create_reference_tables::Migration),
            Box::new(m2025_01_10_000002_create_organizations::Migration),
            Box::new(m2025_01_10_000003_create_organization_submissions::Migration),
        ]
    }
}
