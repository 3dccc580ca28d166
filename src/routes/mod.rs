use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handlers::{auth, bookings, cities, profile, rides};
use crate::middleware::auth::{auth_middleware, require_driver, require_traveller};
use crate::middleware::rate_limit::create_public_governor;
use crate::middleware::role_rate_limit::{create_role_governor, RateLimitedRole};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Role-specific governor layers keyed by user id
    let driver_governor = create_role_governor(RateLimitedRole::Driver);
    let traveller_governor = create_role_governor(RateLimitedRole::Traveller);
    // IP-based governor for public routes
    let public_governor = create_public_governor();

    // Public auth routes
    let auth_routes = Router::new()
        .route("/register/traveller", post(auth::register_traveller))
        .route("/register/driver", post(auth::register_driver))
        .route("/login", post(auth::login))
        .layer(public_governor.clone());

    // Public search and reference-data routes
    let public_routes = Router::new()
        .route("/rides", get(rides::search_rides))
        .route("/rides/{id}", get(rides::get_ride))
        .route("/cities", get(cities::list_cities))
        .route("/locations/validate", get(cities::validate_location_endpoint))
        .layer(public_governor);

    // Profile routes (any authenticated account, driver or traveller)
    let profile_routes = Router::new()
        .route("/", get(profile::get_profile))
        .route("/", put(profile::update_profile))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Driver routes (requires auth + driver capability)
    let driver_routes = Router::new()
        .route("/rides", post(rides::create_ride))
        .route("/rides", get(rides::my_rides))
        .route("/bookings", get(bookings::pending_bookings))
        .route("/bookings/{id}", get(bookings::get_booking))
        .route("/bookings/{id}/confirm", post(bookings::confirm_booking))
        .route("/bookings/{id}/reject", post(bookings::reject_booking))
        .layer(driver_governor)
        .layer(middleware::from_fn(require_driver))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Traveller routes (requires auth + traveller capability)
    let traveller_routes = Router::new()
        .route("/", post(bookings::create_booking))
        .route("/", get(bookings::my_bookings))
        .route("/{id}", get(bookings::get_booking))
        .route("/{id}/cancel", post(bookings::cancel_booking))
        .layer(traveller_governor)
        .layer(middleware::from_fn(require_traveller))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", public_routes)
        .nest("/api/profile", profile_routes)
        .nest("/api/driver", driver_routes)
        .nest("/api/bookings", traveller_routes)
        .with_state(state)
}
