use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::error::{AppError, AppResult};
use crate::utils::authz::{require_capability, Actor, Capability};
use crate::utils::jwt::{verify_token, Claims};
use crate::AppState;

/// Extract and validate JWT token from Authorization header
pub async fn auth_middleware(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let claims = verify_token(auth.token(), &state.config.jwt_secret)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn claims_from_request(request: &Request) -> AppResult<&Claims> {
    request
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| AppError::Unauthorized("No authentication found".to_string()))
}

/// Require the driver capability
pub async fn require_driver(request: Request, next: Next) -> AppResult<Response> {
    let claims = claims_from_request(&request)?;
    require_capability(&Actor::from(claims), Capability::Driver)?;
    Ok(next.run(request).await)
}

/// Require the traveller capability
pub async fn require_traveller(request: Request, next: Next) -> AppResult<Response> {
    let claims = claims_from_request(&request)?;
    require_capability(&Actor::from(claims), Capability::Traveller)?;
    Ok(next.run(request).await)
}
