//! Database migrations for the timetable backend.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2025_01_06_000001_create_users;
mod m2025_01_06_000002_create_resources;
mod m2025_01_06_000003_create_subject_links;
mod m2025_01_06_000004_create_scheduling_constraints;
mod m2025_01_06_000005_create_schedule_entries;
mod m2025_01_06_000006_create_activity_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_01_06_000001_create_users::Migration),
            Box::new(m2025_01_06_000002_create_resources::Migration),
            Box::new(m2025_01_06_000003_create_subject_links::Migration),
            Box::new(m2025_01_06_000004_create_scheduling_constraints::Migration),
            Box::new(m2025_01_06_000005_create_schedule_entries::Migration),
            Box::new(m2025_01_06_000006_create_activity_logs::Migration),
        ]
    }
}
