use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20250301_000002_create_users::User;
use super::m20250301_000004_create_rides::Ride;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(BookingStatus::Enum)
                    .values([
                        BookingStatus::Pending,
                        BookingStatus::Confirmed,
                        BookingStatus::Cancelled,
                        BookingStatus::Completed,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(uuid(Booking::Id).primary_key())
                    .col(uuid(Booking::RideId).not_null())
                    .col(uuid(Booking::TravellerId).not_null())
                    .col(integer(Booking::SeatsBooked).not_null())
                    .col(decimal_len(Booking::TotalPrice, 8, 2).not_null())
                    .col(string_len_null(Booking::CustomPickupLocation, 255))
                    .col(string_len_null(Booking::CustomDropoffLocation, 255))
                    .col(
                        ColumnDef::new(Booking::Status)
                            .custom(BookingStatus::Enum)
                            .not_null(),
                    )
                    .col(text_null(Booking::BookingNotes))
                    .col(
                        timestamp_with_time_zone(Booking::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Booking::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone_null(Booking::ConfirmedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_ride")
                            .from(Booking::Table, Booking::RideId)
                            .to(Ride::Table, Ride::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_traveller")
                            .from(Booking::Table, Booking::TravellerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one active booking per (ride, traveller). Partial unique
        // indexes are not expressible through IndexCreateStatement, so raw SQL.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX idx_booking_active_per_traveller \
                 ON booking (ride_id, traveller_id) \
                 WHERE status IN ('PENDING', 'CONFIRMED')",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(BookingStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Booking {
    Table,
    Id,
    RideId,
    TravellerId,
    SeatsBooked,
    TotalPrice,
    CustomPickupLocation,
    CustomDropoffLocation,
    Status,
    BookingNotes,
    CreatedAt,
    UpdatedAt,
    ConfirmedAt,
}

#[derive(DeriveIden)]
pub enum BookingStatus {
    #[sea_orm(iden = "booking_status")]
    Enum,
    #[sea_orm(iden = "PENDING")]
    Pending,
    #[sea_orm(iden = "CONFIRMED")]
    Confirmed,
    #[sea_orm(iden = "CANCELLED")]
    Cancelled,
    #[sea_orm(iden = "COMPLETED")]
    Completed,
}
