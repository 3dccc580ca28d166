use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A reusable (driver, origin, destination) pairing. Created lazily the first
/// time a driver posts a ride on that city pair; `driver_price` is only a
/// default suggestion for later rides.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "route")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub driver_id: Uuid,
    pub origin_city_id: i32,
    pub destination_city_id: i32,
    pub driver_price: Decimal,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::DriverId",
        to = "super::user::Column::Id"
    )]
    Driver,
    #[sea_orm(
        belongs_to = "super::city::Entity",
        from = "Column::OriginCityId",
        to = "super::city::Column::Id"
    )]
    OriginCity,
    #[sea_orm(
        belongs_to = "super::city::Entity",
        from = "Column::DestinationCityId",
        to = "super::city::Column::Id"
    )]
    DestinationCity,
    #[sea_orm(has_many = "super::ride::Entity")]
    Rides,
}

impl Related<super::ride::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rides.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Driver.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
