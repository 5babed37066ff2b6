//! Migrator registering entity migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20211030_000001_create_haircut;
mod m20211030_000002_create_haircut_image;
mod m20211030_000003_create_user;
mod m20211030_000004_create_photo_user;
mod m20211030_000005_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20211030_000001_create_haircut::Migration),
            Box::new(m20211030_000002_create_haircut_image::Migration),
            Box::new(m20211030_000003_create_user::Migration),
            Box::new(m20211030_000004_create_photo_user::Migration),
            // Indexes should always be applied last
            Box::new(m20211030_000005_add_indexes::Migration),
        ]
    }
}
