use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Error taxonomy of the booking core plus the transport-level cases.
///
/// All domain variants are recoverable at the request boundary: they map to a
/// status code and a human-readable message. Storage errors are never leaked
/// raw; a unique-violation on the active-booking index is translated to
/// `DuplicateBooking` before it reaches here.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("only {available} seats available, {requested} requested")]
    Capacity { requested: i32, available: i32 },

    #[error("an active booking for this ride already exists")]
    DuplicateBooking,

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    State(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Capacity { .. } => StatusCode::CONFLICT,
            AppError::DuplicateBooking => StatusCode::CONFLICT,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::State(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable reason code for the presentation layer to translate.
    fn reason(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::Capacity { .. } => "capacity_error",
            AppError::DuplicateBooking => "duplicate_booking",
            AppError::Authorization(_) => "authorization_error",
            AppError::State(_) => "state_error",
            AppError::NotFound(_) => "not_found",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Conflict(_) => "conflict",
            AppError::Internal(_) | AppError::Database(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                "Internal server error".to_string()
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": self.reason(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_client_statuses() {
        let cases = [
            (
                AppError::Validation("bad".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::Capacity {
                    requested: 3,
                    available: 2,
                },
                StatusCode::CONFLICT,
            ),
            (AppError::DuplicateBooking, StatusCode::CONFLICT),
            (
                AppError::Authorization("no".into()),
                StatusCode::FORBIDDEN,
            ),
            (AppError::State("bad state".into()), StatusCode::CONFLICT),
            (AppError::NotFound("gone".into()), StatusCode::NOT_FOUND),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status_code(), expected);
        }
    }

    #[test]
    fn capacity_message_names_both_counts() {
        let err = AppError::Capacity {
            requested: 3,
            available: 2,
        };
        assert_eq!(err.to_string(), "only 2 seats available, 3 requested");
    }
}
