pub mod auth;
pub mod bookings;
pub mod cities;
pub mod profile;
pub mod rides;
