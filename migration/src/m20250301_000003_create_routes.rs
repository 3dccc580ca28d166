use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000001_create_cities::City;
use super::m20250301_000002_create_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Route::Table)
                    .if_not_exists()
                    .col(uuid(Route::Id).primary_key())
                    .col(uuid(Route::DriverId).not_null())
                    .col(integer(Route::OriginCityId).not_null())
                    .col(integer(Route::DestinationCityId).not_null())
                    .col(decimal_len(Route::DriverPrice, 8, 2).not_null())
                    .col(boolean(Route::IsActive).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(Route::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_route_driver")
                            .from(Route::Table, Route::DriverId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_route_origin_city")
                            .from(Route::Table, Route::OriginCityId)
                            .to(City::Table, City::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_route_destination_city")
                            .from(Route::Table, Route::DestinationCityId)
                            .to(City::Table, City::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // One route per (driver, origin, destination); rides reuse it
        manager
            .create_index(
                Index::create()
                    .name("idx_route_driver_city_pair")
                    .table(Route::Table)
                    .col(Route::DriverId)
                    .col(Route::OriginCityId)
                    .col(Route::DestinationCityId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Route::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Route {
    Table,
    Id,
    DriverId,
    OriginCityId,
    DestinationCityId,
    DriverPrice,
    IsActive,
    CreatedAt,
}
