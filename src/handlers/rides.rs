use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{city, ride};
use crate::error::AppResult;
use crate::rides::{self, NewRide, RideSearch};
use crate::utils::authz::Actor;
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRideRequest {
    pub pickup_city_id: i32,
    pub dropoff_city_id: i32,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub departure_date: NaiveDate,
    pub departure_time: NaiveTime,
    pub available_seats: i32,
    pub price_per_seat: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RideResponse {
    pub id: Uuid,
    pub pickup_city: String,
    pub pickup_location: String,
    pub dropoff_city: String,
    pub dropoff_location: String,
    pub departure_date: NaiveDate,
    pub departure_time: NaiveTime,
    pub total_seats: i32,
    pub available_seats_count: i32,
    pub price_per_seat: Decimal,
    pub status: ride::RideStatus,
    pub notes: Option<String>,
}

fn ride_response(ride: ride::Model, available: i32, cities: &[city::Model]) -> RideResponse {
    let city_name = |id: i32| {
        cities
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
            .unwrap_or_default()
    };

    RideResponse {
        id: ride.id,
        pickup_city: city_name(ride.pickup_city_id),
        pickup_location: ride.pickup_location,
        dropoff_city: city_name(ride.dropoff_city_id),
        dropoff_location: ride.dropoff_location,
        departure_date: ride.departure_date,
        departure_time: ride.departure_time,
        total_seats: ride.available_seats,
        available_seats_count: available,
        price_per_seat: ride.price_per_seat,
        status: ride.status,
        notes: ride.notes,
    }
}

/// Post a new ride (drivers only)
pub async fn create_ride(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateRideRequest>,
) -> AppResult<Json<RideResponse>> {
    let actor = Actor::from(&claims);

    let ride = rides::create_ride(
        &state.db,
        &actor,
        NewRide {
            pickup_city_id: payload.pickup_city_id,
            dropoff_city_id: payload.dropoff_city_id,
            pickup_location: payload.pickup_location,
            dropoff_location: payload.dropoff_location,
            departure_date: payload.departure_date,
            departure_time: payload.departure_time,
            available_seats: payload.available_seats,
            price_per_seat: payload.price_per_seat,
            notes: payload.notes,
        },
    )
    .await?;

    let available = ride.available_seats;
    let cities = city::Entity::find().all(&state.db).await?;

    Ok(Json(ride_response(ride, available, &cities)))
}

#[derive(Debug, Deserialize)]
pub struct SearchRidesQuery {
    pub pickup_city_id: i32,
    pub dropoff_city_id: i32,
    pub departure_date: NaiveDate,
    pub min_seats: Option<i32>,
}

/// Search ACTIVE rides by city pair and date
pub async fn search_rides(
    State(state): State<AppState>,
    Query(query): Query<SearchRidesQuery>,
) -> AppResult<Json<Vec<RideResponse>>> {
    let results = rides::search_rides(
        &state.db,
        &RideSearch {
            pickup_city_id: query.pickup_city_id,
            dropoff_city_id: query.dropoff_city_id,
            departure_date: query.departure_date,
            min_seats: query.min_seats.unwrap_or(1),
        },
    )
    .await?;

    let cities = city::Entity::find().all(&state.db).await?;

    let responses = results
        .into_iter()
        .map(|(ride, available)| ride_response(ride, available, &cities))
        .collect();

    Ok(Json(responses))
}

/// Ride details with derived availability
pub async fn get_ride(
    State(state): State<AppState>,
    Path(ride_id): Path<Uuid>,
) -> AppResult<Json<RideResponse>> {
    let (ride, available) = rides::ride_with_availability(&state.db, ride_id).await?;
    let cities = city::Entity::find().all(&state.db).await?;

    Ok(Json(ride_response(ride, available, &cities)))
}

/// The logged-in driver's rides
pub async fn my_rides(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<RideResponse>>> {
    let actor = Actor::from(&claims);
    let results = rides::rides_for_driver(&state.db, &actor).await?;
    let cities = city::Entity::find().all(&state.db).await?;

    let responses = results
        .into_iter()
        .map(|(ride, available)| ride_response(ride, available, &cities))
        .collect();

    Ok(Json(responses))
}
