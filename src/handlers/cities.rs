use axum::{
    extract::{Query, State},
    Json,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::entities::city;
use crate::error::AppResult;
use crate::utils::location::{validate_location, LocationCheck};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CityInfo {
    pub id: i32,
    pub name: String,
    pub province: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// List active serviceable cities, alphabetically
pub async fn list_cities(State(state): State<AppState>) -> AppResult<Json<Vec<CityInfo>>> {
    let cities = city::Entity::find()
        .filter(city::Column::IsActive.eq(true))
        .order_by_asc(city::Column::Name)
        .all(&state.db)
        .await?;

    let responses: Vec<CityInfo> = cities
        .into_iter()
        .map(|c| CityInfo {
            id: c.id,
            name: c.name,
            province: c.province,
            country: c.country,
            latitude: c.latitude,
            longitude: c.longitude,
        })
        .collect();

    Ok(Json(responses))
}

#[derive(Debug, Deserialize)]
pub struct ValidateLocationQuery {
    #[serde(default)]
    pub location: String,
}

/// Check a free-text location against the serviceable city list
pub async fn validate_location_endpoint(
    State(state): State<AppState>,
    Query(query): Query<ValidateLocationQuery>,
) -> AppResult<Json<LocationCheck>> {
    let cities = city::Entity::find()
        .filter(city::Column::IsActive.eq(true))
        .all(&state.db)
        .await?;

    Ok(Json(validate_location(&query.location, &cities)))
}
