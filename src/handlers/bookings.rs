use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{booking, city, ride};
use crate::error::AppResult;
use crate::rides::{self, NewBooking};
use crate::utils::authz::Actor;
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub ride_id: Uuid,
    pub seats_booked: i32,
    pub custom_pickup_location: Option<String>,
    pub custom_dropoff_location: Option<String>,
    pub booking_notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub pickup_city: String,
    pub dropoff_city: String,
    pub departure_date: NaiveDate,
    pub departure_time: NaiveTime,
    pub seats_booked: i32,
    pub total_price: Decimal,
    pub status: booking::BookingStatus,
    pub booking_notes: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

fn booking_response(
    booking: booking::Model,
    ride: &ride::Model,
    cities: &[city::Model],
) -> BookingResponse {
    let city_name = |id: i32| {
        cities
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
            .unwrap_or_default()
    };

    BookingResponse {
        id: booking.id,
        ride_id: ride.id,
        pickup_city: city_name(ride.pickup_city_id),
        dropoff_city: city_name(ride.dropoff_city_id),
        departure_date: ride.departure_date,
        departure_time: ride.departure_time,
        seats_booked: booking.seats_booked,
        total_price: booking.total_price,
        status: booking.status,
        booking_notes: booking.booking_notes,
        confirmed_at: booking.confirmed_at.map(|t| t.with_timezone(&Utc)),
        created_at: booking.created_at.with_timezone(&Utc),
    }
}

/// Request seats on a ride (travellers only)
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<Json<BookingResponse>> {
    let actor = Actor::from(&claims);

    let booking = rides::create_booking(
        &state.db,
        &actor,
        NewBooking {
            ride_id: payload.ride_id,
            seats_booked: payload.seats_booked,
            custom_pickup_location: payload.custom_pickup_location,
            custom_dropoff_location: payload.custom_dropoff_location,
            booking_notes: payload.booking_notes,
        },
    )
    .await?;

    let (booking, ride) = rides::booking_for_party(&state.db, &actor, booking.id).await?;
    let cities = city::Entity::find().all(&state.db).await?;

    Ok(Json(booking_response(booking, &ride, &cities)))
}

/// The logged-in traveller's bookings
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<BookingResponse>>> {
    let actor = Actor::from(&claims);
    let results = rides::bookings_for_traveller(&state.db, &actor).await?;
    let cities = city::Entity::find().all(&state.db).await?;

    let responses = results
        .into_iter()
        .map(|(booking, ride)| booking_response(booking, &ride, &cities))
        .collect();

    Ok(Json(responses))
}

/// Booking details, visible to its traveller and the ride's driver
pub async fn get_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<BookingResponse>> {
    let actor = Actor::from(&claims);
    let (booking, ride) = rides::booking_for_party(&state.db, &actor, booking_id).await?;
    let cities = city::Entity::find().all(&state.db).await?;

    Ok(Json(booking_response(booking, &ride, &cities)))
}

/// Cancel a pending booking (traveller only)
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<BookingResponse>> {
    let actor = Actor::from(&claims);
    let booking = rides::cancel_booking(&state.db, &actor, booking_id).await?;

    let (booking, ride) = rides::booking_for_party(&state.db, &actor, booking.id).await?;
    let cities = city::Entity::find().all(&state.db).await?;

    Ok(Json(booking_response(booking, &ride, &cities)))
}

/// Pending booking requests across the driver's rides
pub async fn pending_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<BookingResponse>>> {
    let actor = Actor::from(&claims);
    let results = rides::pending_bookings_for_driver(&state.db, &actor).await?;
    let cities = city::Entity::find().all(&state.db).await?;

    let responses = results
        .into_iter()
        .map(|(booking, ride)| booking_response(booking, &ride, &cities))
        .collect();

    Ok(Json(responses))
}

/// Confirm a pending booking (ride's driver only)
pub async fn confirm_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<BookingResponse>> {
    let actor = Actor::from(&claims);
    let booking = rides::confirm_booking(&state.db, &actor, booking_id).await?;

    let (booking, ride) = rides::booking_for_party(&state.db, &actor, booking.id).await?;
    let cities = city::Entity::find().all(&state.db).await?;

    Ok(Json(booking_response(booking, &ride, &cities)))
}

/// Reject a pending booking (ride's driver only)
pub async fn reject_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<BookingResponse>> {
    let actor = Actor::from(&claims);
    let booking = rides::reject_booking(&state.db, &actor, booking_id).await?;

    let (booking, ride) = rides::booking_for_party(&state.db, &actor, booking.id).await?;
    let cities = city::Entity::find().all(&state.db).await?;

    Ok(Json(booking_response(booking, &ride, &cities)))
}
