//! Booking core: ride and booking lifecycles, capacity accounting, and the
//! confirm/reject/cancel state machine.
//!
//! Handlers stay thin; every operation here takes an [`Actor`] and enforces
//! its own authorization and state rules. Capacity-changing writes
//! (`create_booking`, `confirm_booking`) run inside serializable
//! transactions and re-validate availability immediately before the write;
//! the partial unique index on active bookings backstops duplicate
//! submissions that race past the in-transaction check.

pub mod rules;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, IsolationLevel, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::city;
use crate::entities::ride::{self, RideStatus};
use crate::entities::route;
use crate::error::{AppError, AppResult};
use crate::utils::authz::{require_capability, Actor, Capability};

pub use rules::{NewBooking, NewRide, RideSearch};

/// Seats held by CONFIRMED bookings on a ride.
async fn confirmed_seats<C: ConnectionTrait>(conn: &C, ride_id: Uuid) -> AppResult<i32> {
    let seats = booking::Entity::find()
        .filter(booking::Column::RideId.eq(ride_id))
        .filter(booking::Column::Status.eq(BookingStatus::Confirmed))
        .all(conn)
        .await?
        .iter()
        .map(|b| b.seats_booked)
        .sum();

    Ok(seats)
}

/// Derived availability for a ride, recomputed from its bookings.
pub async fn available_seats_count<C: ConnectionTrait>(
    conn: &C,
    ride: &ride::Model,
) -> AppResult<i32> {
    let confirmed = confirmed_seats(conn, ride.id).await?;
    Ok(rules::available_seats_count(ride.available_seats, [confirmed]))
}

async fn find_active_city<C: ConnectionTrait>(conn: &C, city_id: i32) -> AppResult<city::Model> {
    let city = city::Entity::find_by_id(city_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::Validation(format!("Unknown city id {}", city_id)))?;

    if !city.is_active {
        return Err(AppError::Validation(format!(
            "{} is not currently serviceable",
            city.name
        )));
    }

    Ok(city)
}

/// Create a ride, lazily creating the driver's route for the city pair.
///
/// The route's `driver_price` is only a default suggestion; the ride's own
/// `price_per_seat` is authoritative for booking totals.
pub async fn create_ride(
    db: &DatabaseConnection,
    actor: &Actor,
    input: NewRide,
) -> AppResult<ride::Model> {
    require_capability(actor, Capability::Driver)?;
    rules::validate_new_ride(&input, Utc::now().date_naive())?;

    find_active_city(db, input.pickup_city_id).await?;
    find_active_city(db, input.dropoff_city_id).await?;

    let txn = db.begin().await?;

    let existing_route = route::Entity::find()
        .filter(route::Column::DriverId.eq(actor.id))
        .filter(route::Column::OriginCityId.eq(input.pickup_city_id))
        .filter(route::Column::DestinationCityId.eq(input.dropoff_city_id))
        .one(&txn)
        .await?;

    let route = match existing_route {
        Some(route) => route,
        None => {
            route::ActiveModel {
                id: Set(Uuid::new_v4()),
                driver_id: Set(actor.id),
                origin_city_id: Set(input.pickup_city_id),
                destination_city_id: Set(input.dropoff_city_id),
                driver_price: Set(input.price_per_seat),
                is_active: Set(true),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };

    let ride = ride::ActiveModel {
        id: Set(Uuid::new_v4()),
        route_id: Set(route.id),
        driver_id: Set(actor.id),
        departure_date: Set(input.departure_date),
        departure_time: Set(input.departure_time),
        available_seats: Set(input.available_seats),
        pickup_location: Set(input.pickup_location),
        pickup_city_id: Set(input.pickup_city_id),
        dropoff_location: Set(input.dropoff_location),
        dropoff_city_id: Set(input.dropoff_city_id),
        price_per_seat: Set(input.price_per_seat),
        notes: Set(input.notes),
        status: Set(RideStatus::Active),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(ride_id = %ride.id, driver_id = %actor.id, "ride created");

    Ok(ride)
}

/// ACTIVE rides matching exactly on city pair and date, with at least
/// `min_seats` available, ordered by departure time. Returns each ride with
/// its derived availability.
pub async fn search_rides(
    db: &DatabaseConnection,
    query: &RideSearch,
) -> AppResult<Vec<(ride::Model, i32)>> {
    let rides = ride::Entity::find()
        .filter(ride::Column::PickupCityId.eq(query.pickup_city_id))
        .filter(ride::Column::DropoffCityId.eq(query.dropoff_city_id))
        .filter(ride::Column::DepartureDate.eq(query.departure_date))
        .filter(ride::Column::Status.eq(RideStatus::Active))
        .order_by_asc(ride::Column::DepartureTime)
        .all(db)
        .await?;

    let mut results = Vec::new();
    for ride in rides {
        let available = available_seats_count(db, &ride).await?;
        if available >= query.min_seats {
            results.push((ride, available));
        }
    }

    Ok(results)
}

pub async fn ride_with_availability(
    db: &DatabaseConnection,
    ride_id: Uuid,
) -> AppResult<(ride::Model, i32)> {
    let ride = ride::Entity::find_by_id(ride_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ride not found".to_string()))?;

    let available = available_seats_count(db, &ride).await?;
    Ok((ride, available))
}

/// The logged-in driver's rides, newest departure first, with availability.
pub async fn rides_for_driver(
    db: &DatabaseConnection,
    actor: &Actor,
) -> AppResult<Vec<(ride::Model, i32)>> {
    require_capability(actor, Capability::Driver)?;

    let rides = ride::Entity::find()
        .filter(ride::Column::DriverId.eq(actor.id))
        .order_by_desc(ride::Column::DepartureDate)
        .all(db)
        .await?;

    let mut results = Vec::new();
    for ride in rides {
        let available = available_seats_count(db, &ride).await?;
        results.push((ride, available));
    }

    Ok(results)
}

/// Create a PENDING booking for the acting traveller.
pub async fn create_booking(
    db: &DatabaseConnection,
    actor: &Actor,
    input: NewBooking,
) -> AppResult<booking::Model> {
    require_capability(actor, Capability::Traveller)?;
    rules::validate_seats_requested(input.seats_booked)?;

    let txn = db
        .begin_with_config(Some(IsolationLevel::Serializable), None)
        .await?;

    let ride = ride::Entity::find_by_id(input.ride_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Ride not found".to_string()))?;

    rules::ensure_not_own_ride(ride.driver_id, actor.id)?;
    rules::ensure_ride_active(&ride.status)?;

    if ride.departure_date < Utc::now().date_naive() {
        return Err(AppError::Validation(
            "Cannot book a ride that has already departed".to_string(),
        ));
    }

    let existing = booking::Entity::find()
        .filter(booking::Column::RideId.eq(ride.id))
        .filter(booking::Column::TravellerId.eq(actor.id))
        .filter(booking::Column::Status.is_in([BookingStatus::Pending, BookingStatus::Confirmed]))
        .one(&txn)
        .await?;
    rules::ensure_no_active_booking(existing.is_some())?;

    let available = available_seats_count(&txn, &ride).await?;
    rules::ensure_capacity(input.seats_booked, available)?;

    let new_booking = booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        ride_id: Set(ride.id),
        traveller_id: Set(actor.id),
        seats_booked: Set(input.seats_booked),
        total_price: Set(rules::total_price(ride.price_per_seat, input.seats_booked)),
        custom_pickup_location: Set(input.custom_pickup_location),
        custom_dropoff_location: Set(input.custom_dropoff_location),
        status: Set(BookingStatus::Pending),
        booking_notes: Set(input.booking_notes),
        ..Default::default()
    };

    // The partial unique index catches duplicate submissions racing past the
    // check above; surface those as the domain error, not a storage error.
    let booking = match new_booking.insert(&txn).await {
        Ok(booking) => booking,
        Err(err) => {
            return Err(match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateBooking,
                _ => err.into(),
            });
        }
    };

    txn.commit().await?;

    tracing::info!(
        booking_id = %booking.id,
        ride_id = %ride.id,
        seats = booking.seats_booked,
        "booking requested"
    );

    Ok(booking)
}

async fn booking_with_ride<C: ConnectionTrait>(
    conn: &C,
    booking_id: Uuid,
) -> AppResult<(booking::Model, ride::Model)> {
    let booking = booking::Entity::find_by_id(booking_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    let ride = ride::Entity::find_by_id(booking.ride_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Ride not found".to_string()))?;

    Ok((booking, ride))
}

/// Confirm a PENDING booking. Driver-only; capacity is re-validated here
/// because other bookings may have been confirmed since creation. Flips the
/// ride to FULL when the last seat is taken.
pub async fn confirm_booking(
    db: &DatabaseConnection,
    actor: &Actor,
    booking_id: Uuid,
) -> AppResult<booking::Model> {
    require_capability(actor, Capability::Driver)?;

    let txn = db
        .begin_with_config(Some(IsolationLevel::Serializable), None)
        .await?;

    let (booking, ride) = booking_with_ride(&txn, booking_id).await?;

    rules::ensure_ride_owner(ride.driver_id, actor.id, "confirm")?;
    rules::ensure_pending(&booking.status, "confirm")?;

    let available = available_seats_count(&txn, &ride).await?;
    rules::ensure_capacity(booking.seats_booked, available)?;

    let now = Utc::now().into();
    let seats = booking.seats_booked;

    let mut active = booking.into_active_model();
    active.status = Set(BookingStatus::Confirmed);
    active.confirmed_at = Set(Some(now));
    active.updated_at = Set(now);
    let booking = active.update(&txn).await?;

    if rules::exhausts_capacity(seats, available) {
        let ride_id = ride.id;
        let mut full = ride.into_active_model();
        full.status = Set(RideStatus::Full);
        full.updated_at = Set(now);
        full.update(&txn).await?;

        tracing::info!(ride_id = %ride_id, "ride is now full");
    }

    txn.commit().await?;

    tracing::info!(booking_id = %booking.id, "booking confirmed");

    Ok(booking)
}

/// Reject a PENDING booking. Driver-only; no capacity side effect since
/// pending seats were never counted against capacity.
pub async fn reject_booking(
    db: &DatabaseConnection,
    actor: &Actor,
    booking_id: Uuid,
) -> AppResult<booking::Model> {
    require_capability(actor, Capability::Driver)?;

    let txn = db.begin().await?;

    let (booking, ride) = booking_with_ride(&txn, booking_id).await?;

    rules::ensure_ride_owner(ride.driver_id, actor.id, "reject")?;
    rules::ensure_pending(&booking.status, "reject")?;

    let mut active = booking.into_active_model();
    active.status = Set(BookingStatus::Cancelled);
    active.updated_at = Set(Utc::now().into());
    let booking = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(booking_id = %booking.id, "booking rejected");

    Ok(booking)
}

/// Cancel a PENDING booking. Traveller-only; confirmed bookings cannot be
/// cancelled through this core.
pub async fn cancel_booking(
    db: &DatabaseConnection,
    actor: &Actor,
    booking_id: Uuid,
) -> AppResult<booking::Model> {
    require_capability(actor, Capability::Traveller)?;

    let txn = db.begin().await?;

    let (booking, _ride) = booking_with_ride(&txn, booking_id).await?;

    rules::ensure_booking_owner(booking.traveller_id, actor.id)?;
    rules::ensure_pending(&booking.status, "cancel")?;

    let mut active = booking.into_active_model();
    active.status = Set(BookingStatus::Cancelled);
    active.updated_at = Set(Utc::now().into());
    let booking = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(booking_id = %booking.id, "booking cancelled by traveller");

    Ok(booking)
}

/// A booking with its ride, readable only by the booking's parties.
pub async fn booking_for_party(
    db: &DatabaseConnection,
    actor: &Actor,
    booking_id: Uuid,
) -> AppResult<(booking::Model, ride::Model)> {
    let (booking, ride) = booking_with_ride(db, booking_id).await?;

    if booking.traveller_id != actor.id && ride.driver_id != actor.id {
        return Err(AppError::Authorization(
            "You don't have permission to view this booking".to_string(),
        ));
    }

    Ok((booking, ride))
}

/// PENDING requests across the driver's rides, newest first.
pub async fn pending_bookings_for_driver(
    db: &DatabaseConnection,
    actor: &Actor,
) -> AppResult<Vec<(booking::Model, ride::Model)>> {
    require_capability(actor, Capability::Driver)?;

    let rides = ride::Entity::find()
        .filter(ride::Column::DriverId.eq(actor.id))
        .all(db)
        .await?;

    let ride_ids: Vec<Uuid> = rides.iter().map(|r| r.id).collect();

    let bookings = booking::Entity::find()
        .filter(booking::Column::RideId.is_in(ride_ids))
        .filter(booking::Column::Status.eq(BookingStatus::Pending))
        .order_by_desc(booking::Column::CreatedAt)
        .all(db)
        .await?;

    let results = bookings
        .into_iter()
        .filter_map(|b| {
            let ride = rides.iter().find(|r| r.id == b.ride_id)?.clone();
            Some((b, ride))
        })
        .collect();

    Ok(results)
}

/// The traveller's own bookings, newest first, each with its ride.
pub async fn bookings_for_traveller(
    db: &DatabaseConnection,
    actor: &Actor,
) -> AppResult<Vec<(booking::Model, ride::Model)>> {
    require_capability(actor, Capability::Traveller)?;

    let bookings = booking::Entity::find()
        .filter(booking::Column::TravellerId.eq(actor.id))
        .order_by_desc(booking::Column::CreatedAt)
        .all(db)
        .await?;

    let ride_ids: Vec<Uuid> = bookings.iter().map(|b| b.ride_id).collect();
    let rides = ride::Entity::find()
        .filter(ride::Column::Id.is_in(ride_ids))
        .all(db)
        .await?;

    let results = bookings
        .into_iter()
        .filter_map(|b| {
            let ride = rides.iter().find(|r| r.id == b.ride_id)?.clone();
            Some((b, ride))
        })
        .collect();

    Ok(results)
}
