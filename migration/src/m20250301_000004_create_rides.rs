use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20250301_000001_create_cities::City;
use super::m20250301_000002_create_users::User;
use super::m20250301_000003_create_routes::Route;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(RideStatus::Enum)
                    .values([
                        RideStatus::Active,
                        RideStatus::Full,
                        RideStatus::Completed,
                        RideStatus::Cancelled,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ride::Table)
                    .if_not_exists()
                    .col(uuid(Ride::Id).primary_key())
                    .col(uuid(Ride::RouteId).not_null())
                    .col(uuid(Ride::DriverId).not_null())
                    .col(date(Ride::DepartureDate).not_null())
                    .col(time(Ride::DepartureTime).not_null())
                    .col(integer(Ride::AvailableSeats).not_null())
                    .col(string_len(Ride::PickupLocation, 255).not_null())
                    .col(integer(Ride::PickupCityId).not_null())
                    .col(string_len(Ride::DropoffLocation, 255).not_null())
                    .col(integer(Ride::DropoffCityId).not_null())
                    .col(decimal_len(Ride::PricePerSeat, 8, 2).not_null())
                    .col(text_null(Ride::Notes))
                    .col(
                        ColumnDef::new(Ride::Status)
                            .custom(RideStatus::Enum)
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(Ride::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Ride::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ride_route")
                            .from(Ride::Table, Ride::RouteId)
                            .to(Route::Table, Route::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ride_driver")
                            .from(Ride::Table, Ride::DriverId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ride_pickup_city")
                            .from(Ride::Table, Ride::PickupCityId)
                            .to(City::Table, City::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ride_dropoff_city")
                            .from(Ride::Table, Ride::DropoffCityId)
                            .to(City::Table, City::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Search is exact-match on (pickup, dropoff, date)
        manager
            .create_index(
                Index::create()
                    .name("idx_ride_search")
                    .table(Ride::Table)
                    .col(Ride::PickupCityId)
                    .col(Ride::DropoffCityId)
                    .col(Ride::DepartureDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ride::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(RideStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Ride {
    Table,
    Id,
    RouteId,
    DriverId,
    DepartureDate,
    DepartureTime,
    AvailableSeats,
    PickupLocation,
    PickupCityId,
    DropoffLocation,
    DropoffCityId,
    PricePerSeat,
    Notes,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum RideStatus {
    #[sea_orm(iden = "ride_status")]
    Enum,
    #[sea_orm(iden = "ACTIVE")]
    Active,
    #[sea_orm(iden = "FULL")]
    Full,
    #[sea_orm(iden = "COMPLETED")]
    Completed,
    #[sea_orm(iden = "CANCELLED")]
    Cancelled,
}
