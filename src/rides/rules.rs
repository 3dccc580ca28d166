//! Pure validation and capacity rules for the booking core.
//!
//! Everything here operates on plain values so the state machine can be
//! exercised without a database or an HTTP stack. The service layer in the
//! parent module is responsible for re-running these checks inside a
//! transaction before any capacity-changing write.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::entities::booking::BookingStatus;
use crate::entities::ride::RideStatus;
use crate::error::{AppError, AppResult};

/// Seats a driver may declare on a ride.
pub const MIN_RIDE_SEATS: i32 = 1;
pub const MAX_RIDE_SEATS: i32 = 8;

/// Seats a traveller may request in one booking.
pub const MIN_BOOKING_SEATS: i32 = 1;
pub const MAX_BOOKING_SEATS: i32 = 4;

/// Input for creating a ride, decoupled from any request format.
#[derive(Debug, Clone)]
pub struct NewRide {
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

/// Input for creating a booking.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub ride_id: Uuid,
    pub seats_booked: i32,
    pub custom_pickup_location: Option<String>,
    pub custom_dropoff_location: Option<String>,
    pub booking_notes: Option<String>,
}

/// Search query: exact city and date match only, no fuzzy matching.
#[derive(Debug, Clone)]
pub struct RideSearch {
    pub pickup_city_id: i32,
    pub dropoff_city_id: i32,
    pub departure_date: NaiveDate,
    pub min_seats: i32,
}

/// Derived seat availability: declared capacity minus seats held by
/// CONFIRMED bookings. Recomputed on every read, never persisted.
pub fn available_seats_count(capacity: i32, confirmed_seats: impl IntoIterator<Item = i32>) -> i32 {
    capacity - confirmed_seats.into_iter().sum::<i32>()
}

pub fn validate_new_ride(input: &NewRide, today: NaiveDate) -> AppResult<()> {
    if input.departure_date < today {
        return Err(AppError::Validation(
            "Departure date cannot be in the past".to_string(),
        ));
    }

    if input.pickup_city_id == input.dropoff_city_id {
        return Err(AppError::Validation(
            "Pickup and drop-off cities must be different".to_string(),
        ));
    }

    if !(MIN_RIDE_SEATS..=MAX_RIDE_SEATS).contains(&input.available_seats) {
        return Err(AppError::Validation(format!(
            "Available seats must be between {} and {}",
            MIN_RIDE_SEATS, MAX_RIDE_SEATS
        )));
    }

    if input.price_per_seat <= Decimal::ZERO {
        return Err(AppError::Validation(
            "Price per seat must be positive".to_string(),
        ));
    }

    if input.pickup_location.trim().is_empty() || input.dropoff_location.trim().is_empty() {
        return Err(AppError::Validation(
            "Pickup and drop-off locations are required".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_seats_requested(seats: i32) -> AppResult<()> {
    if (MIN_BOOKING_SEATS..=MAX_BOOKING_SEATS).contains(&seats) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Seats per booking must be between {} and {}",
            MIN_BOOKING_SEATS, MAX_BOOKING_SEATS
        )))
    }
}

/// The check-then-act capacity guard. Callers must run it against an
/// availability figure computed inside the same transaction as the write.
pub fn ensure_capacity(requested: i32, available: i32) -> AppResult<()> {
    if requested > available {
        Err(AppError::Capacity {
            requested,
            available,
        })
    } else {
        Ok(())
    }
}

/// True when confirming `requested` seats uses up the last available seat,
/// which must flip the ride ACTIVE -> FULL exactly once.
pub fn exhausts_capacity(requested: i32, available: i32) -> bool {
    requested == available
}

/// Bookings can only be taken against an ACTIVE ride.
pub fn ensure_ride_active(status: &RideStatus) -> AppResult<()> {
    match status {
        RideStatus::Active => Ok(()),
        RideStatus::Full => Err(AppError::State("This ride is full".to_string())),
        RideStatus::Completed => {
            Err(AppError::State("This ride has already run".to_string()))
        }
        RideStatus::Cancelled => Err(AppError::State("This ride was cancelled".to_string())),
    }
}

/// Confirm, reject and cancel all start from PENDING; everything else is
/// terminal for this core.
pub fn ensure_pending(status: &BookingStatus, action: &str) -> AppResult<()> {
    if *status == BookingStatus::Pending {
        Ok(())
    } else {
        Err(AppError::State(format!(
            "Cannot {} a booking that is not pending",
            action
        )))
    }
}

/// At most one PENDING/CONFIRMED booking per (ride, traveller).
pub fn ensure_no_active_booking(has_active_booking: bool) -> AppResult<()> {
    if has_active_booking {
        Err(AppError::DuplicateBooking)
    } else {
        Ok(())
    }
}

/// Only the ride's driver may confirm or reject its booking requests.
pub fn ensure_ride_owner(ride_driver_id: Uuid, actor_id: Uuid, action: &str) -> AppResult<()> {
    if ride_driver_id == actor_id {
        Ok(())
    } else {
        Err(AppError::Authorization(format!(
            "Only the ride's driver can {} bookings",
            action
        )))
    }
}

/// Only the booking's traveller may cancel it.
pub fn ensure_booking_owner(traveller_id: Uuid, actor_id: Uuid) -> AppResult<()> {
    if traveller_id == actor_id {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "You can only cancel your own bookings".to_string(),
        ))
    }
}

/// Drivers cannot book seats on their own rides.
pub fn ensure_not_own_ride(ride_driver_id: Uuid, actor_id: Uuid) -> AppResult<()> {
    if ride_driver_id == actor_id {
        Err(AppError::Authorization(
            "Drivers cannot book their own rides".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Total price is fixed at creation time from the ride's own per-seat price.
pub fn total_price(price_per_seat: Decimal, seats: i32) -> Decimal {
    price_per_seat * Decimal::from(seats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_ride(date: NaiveDate) -> NewRide {
        NewRide {
            pickup_city_id: 1,
            dropoff_city_id: 2,
            pickup_location: "Union Station".to_string(),
            dropoff_location: "Rideau Centre".to_string(),
            departure_date: date,
            departure_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            available_seats: 4,
            price_per_seat: Decimal::new(2500, 2),
            notes: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
    }

    #[test]
    fn availability_is_capacity_minus_confirmed_seats() {
        assert_eq!(available_seats_count(4, []), 4);
        assert_eq!(available_seats_count(4, [2]), 2);
        assert_eq!(available_seats_count(4, [2, 1]), 1);
        assert_eq!(available_seats_count(4, [2, 2]), 0);
    }

    #[test]
    fn ride_in_the_past_is_rejected() {
        let input = new_ride(today().pred_opt().unwrap());
        assert!(matches!(
            validate_new_ride(&input, today()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn ride_today_or_later_is_accepted() {
        assert!(validate_new_ride(&new_ride(today()), today()).is_ok());
        assert!(validate_new_ride(&new_ride(today().succ_opt().unwrap()), today()).is_ok());
    }

    #[test]
    fn same_pickup_and_dropoff_city_is_rejected() {
        let mut input = new_ride(today());
        input.dropoff_city_id = input.pickup_city_id;
        assert!(matches!(
            validate_new_ride(&input, today()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn declared_seats_must_be_within_bounds() {
        for seats in [0, 9, -1] {
            let mut input = new_ride(today());
            input.available_seats = seats;
            assert!(validate_new_ride(&input, today()).is_err(), "seats={}", seats);
        }
        for seats in [1, 8] {
            let mut input = new_ride(today());
            input.available_seats = seats;
            assert!(validate_new_ride(&input, today()).is_ok(), "seats={}", seats);
        }
    }

    #[test]
    fn non_positive_price_is_rejected() {
        let mut input = new_ride(today());
        input.price_per_seat = Decimal::ZERO;
        assert!(validate_new_ride(&input, today()).is_err());
    }

    #[test]
    fn booking_seat_request_bounds() {
        assert!(validate_seats_requested(0).is_err());
        assert!(validate_seats_requested(5).is_err());
        assert!(validate_seats_requested(1).is_ok());
        assert!(validate_seats_requested(4).is_ok());
    }

    #[test]
    fn capacity_guard_rejects_overbooking() {
        assert!(ensure_capacity(3, 4).is_ok());
        assert!(ensure_capacity(4, 4).is_ok());
        assert!(matches!(
            ensure_capacity(5, 4),
            Err(AppError::Capacity {
                requested: 5,
                available: 4
            })
        ));
    }

    #[test]
    fn only_pending_bookings_can_transition() {
        assert!(ensure_pending(&BookingStatus::Pending, "confirm").is_ok());
        for status in [
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            assert!(matches!(
                ensure_pending(&status, "confirm"),
                Err(AppError::State(_))
            ));
        }
    }

    #[test]
    fn only_active_rides_accept_bookings() {
        assert!(ensure_ride_active(&RideStatus::Active).is_ok());
        for status in [RideStatus::Full, RideStatus::Completed, RideStatus::Cancelled] {
            assert!(matches!(
                ensure_ride_active(&status),
                Err(AppError::State(_))
            ));
        }
    }

    #[test]
    fn duplicate_active_booking_is_rejected() {
        assert!(ensure_no_active_booking(false).is_ok());
        assert!(matches!(
            ensure_no_active_booking(true),
            Err(AppError::DuplicateBooking)
        ));
    }

    #[test]
    fn only_the_rides_driver_may_confirm_or_reject() {
        let driver = Uuid::new_v4();
        let other_driver = Uuid::new_v4();

        assert!(ensure_ride_owner(driver, driver, "confirm").is_ok());
        assert!(matches!(
            ensure_ride_owner(driver, other_driver, "confirm"),
            Err(AppError::Authorization(_))
        ));
        assert!(matches!(
            ensure_ride_owner(driver, other_driver, "reject"),
            Err(AppError::Authorization(_))
        ));
    }

    #[test]
    fn only_the_bookings_traveller_may_cancel() {
        let traveller = Uuid::new_v4();
        let other_traveller = Uuid::new_v4();

        assert!(ensure_booking_owner(traveller, traveller).is_ok());
        assert!(matches!(
            ensure_booking_owner(traveller, other_traveller),
            Err(AppError::Authorization(_))
        ));
    }

    #[test]
    fn drivers_cannot_book_their_own_rides() {
        let driver = Uuid::new_v4();
        let traveller = Uuid::new_v4();

        assert!(ensure_not_own_ride(driver, traveller).is_ok());
        assert!(matches!(
            ensure_not_own_ride(driver, driver),
            Err(AppError::Authorization(_))
        ));
    }

    #[test]
    fn total_price_is_seats_times_per_seat_price() {
        let price = Decimal::new(2500, 2); // $25.00
        assert_eq!(total_price(price, 2), Decimal::new(5000, 2));
        assert_eq!(total_price(price, 1), price);
    }

    // Ride with 4 seats at $25: A requests 2, B requests 3. Both pass the
    // creation-time check (nothing is confirmed yet), A confirms fine, and
    // B's confirmation must then fail because only 2 seats remain.
    #[test]
    fn competing_confirmations_cannot_overbook() {
        let capacity = 4;
        let price = Decimal::new(2500, 2);

        // Booking A: 2 seats, $50.00, nothing confirmed yet
        let available = available_seats_count(capacity, []);
        assert!(ensure_capacity(2, available).is_ok());
        assert_eq!(total_price(price, 2), Decimal::new(5000, 2));

        // Booking B: 3 seats, still checked against 4 available
        assert!(ensure_capacity(3, available).is_ok());

        // Driver confirms A
        assert!(ensure_capacity(2, available).is_ok());
        assert!(!exhausts_capacity(2, available));
        let available = available_seats_count(capacity, [2]);
        assert_eq!(available, 2);

        // Confirming B must now fail: 3 > 2
        assert!(matches!(
            ensure_capacity(3, available),
            Err(AppError::Capacity {
                requested: 3,
                available: 2
            })
        ));
    }

    // Single-seat ride: confirming the only booking exhausts capacity and
    // must flip the ride to FULL.
    #[test]
    fn confirming_last_seat_fills_the_ride() {
        let capacity = 1;

        let available = available_seats_count(capacity, []);
        assert!(ensure_capacity(1, available).is_ok());
        assert!(exhausts_capacity(1, available));
        assert_eq!(available_seats_count(capacity, [1]), 0);

        // Once FULL, further confirmations are blocked at the state gate
        assert!(ensure_ride_active(&RideStatus::Full).is_err());
    }
}
