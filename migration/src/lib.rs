pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_cities;
mod m20250301_000002_create_users;
mod m20250301_000003_create_routes;
mod m20250301_000004_create_rides;
mod m20250301_000005_create_bookings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_cities::Migration),
            Box::new(m20250301_000002_create_users::Migration),
            Box::new(m20250301_000003_create_routes::Migration),
            Box::new(m20250301_000004_create_rides::Migration),
            Box::new(m20250301_000005_create_bookings::Migration),
        ]
    }
}
