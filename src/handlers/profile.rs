use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::user;
use crate::error::{AppError, AppResult};
use crate::utils::jwt::Claims;
use crate::AppState;

/// Longest phone number the account schema stores.
const MAX_PHONE_LEN: usize = 20;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub is_driver: bool,
    pub is_traveller: bool,
    pub created_at: DateTime<Utc>,
}

fn profile_response(user: user::Model) -> ProfileResponse {
    ProfileResponse {
        id: user.id,
        email: user.email,
        full_name: user.full_name,
        phone_number: user.phone_number,
        is_driver: user.is_driver,
        is_traveller: user.is_traveller,
        created_at: user.created_at.with_timezone(&Utc),
    }
}

async fn own_account(state: &AppState, claims: &Claims) -> AppResult<user::Model> {
    user::Entity::find_by_id(claims.sub)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".to_string()))
}

/// The logged-in account's profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<ProfileResponse>> {
    let user = own_account(&state, &claims).await?;
    Ok(Json(profile_response(user)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
}

fn validate_profile_update(payload: &UpdateProfileRequest) -> AppResult<()> {
    if let Some(name) = &payload.full_name {
        if name.trim().is_empty() {
            return Err(AppError::Validation(
                "Full name cannot be empty".to_string(),
            ));
        }
    }

    if let Some(phone) = &payload.phone_number {
        if phone.trim().len() > MAX_PHONE_LEN {
            return Err(AppError::Validation(format!(
                "Phone number cannot exceed {} characters",
                MAX_PHONE_LEN
            )));
        }
    }

    Ok(())
}

/// Update the logged-in account's name and phone number. Fields left out of
/// the payload are untouched; an empty phone number clears it.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ProfileResponse>> {
    validate_profile_update(&payload)?;

    let user = own_account(&state, &claims).await?;

    let mut active = user.into_active_model();
    if let Some(name) = payload.full_name {
        active.full_name = Set(name.trim().to_string());
    }
    if let Some(phone) = payload.phone_number {
        let phone = phone.trim().to_string();
        active.phone_number = Set((!phone.is_empty()).then_some(phone));
    }

    let user = active.update(&state.db).await?;

    tracing::info!(user_id = %user.id, "profile updated");

    Ok(Json(profile_response(user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_full_name_is_rejected() {
        let payload = UpdateProfileRequest {
            full_name: Some("   ".to_string()),
            phone_number: None,
        };
        assert!(matches!(
            validate_profile_update(&payload),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn overlong_phone_number_is_rejected() {
        let payload = UpdateProfileRequest {
            full_name: None,
            phone_number: Some("0".repeat(MAX_PHONE_LEN + 1)),
        };
        assert!(matches!(
            validate_profile_update(&payload),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn partial_updates_are_accepted() {
        let name_only = UpdateProfileRequest {
            full_name: Some("Avery Chen".to_string()),
            phone_number: None,
        };
        assert!(validate_profile_update(&name_only).is_ok());

        let phone_only = UpdateProfileRequest {
            full_name: None,
            phone_number: Some("613-555-0188".to_string()),
        };
        assert!(validate_profile_update(&phone_only).is_ok());

        let empty = UpdateProfileRequest {
            full_name: None,
            phone_number: None,
        };
        assert!(validate_profile_update(&empty).is_ok());
    }
}
