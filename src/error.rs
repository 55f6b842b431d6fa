//! Error types for Circula server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Circulation error codes exposed to API clients; 0 is not used so every
/// error body carries a nonzero code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    OutOfStock = 1,
    NoCopyAvailable = 2,
    DuplicateReservation = 3,
    InvalidState = 4,
    ReasonRequired = 5,
    UnknownCopy = 6,
    UnknownEntity = 7,
    InvalidAdjustment = 8,
    AlreadyReturned = 9,
    InfrastructureError = 10,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("No free copy in stock for title {0}")]
    OutOfStock(i64),

    #[error("No copy available for title {0}; offer a reservation instead")]
    NoCopyAvailable(i64),

    #[error("User {user_id} already has a reservation or open loan for title {title_id}")]
    DuplicateReservation { user_id: i64, title_id: i64 },

    #[error("Invalid state transition: {0}")]
    InvalidState(String),

    #[error("A rejection reason is required")]
    ReasonRequired,

    #[error("Unknown copy {0}")]
    UnknownCopy(i64),

    #[error("Unknown {kind} {id}")]
    UnknownEntity { kind: &'static str, id: i64 },

    #[error("Invalid copy-count adjustment: {0}")]
    InvalidAdjustment(String),

    #[error("Borrow request {0} was already returned")]
    AlreadyReturned(i64),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl AppError {
    /// The wire-level error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::OutOfStock(_) => ErrorCode::OutOfStock,
            AppError::NoCopyAvailable(_) => ErrorCode::NoCopyAvailable,
            AppError::DuplicateReservation { .. } => ErrorCode::DuplicateReservation,
            AppError::InvalidState(_) => ErrorCode::InvalidState,
            AppError::ReasonRequired => ErrorCode::ReasonRequired,
            AppError::UnknownCopy(_) => ErrorCode::UnknownCopy,
            AppError::UnknownEntity { .. } => ErrorCode::UnknownEntity,
            AppError::InvalidAdjustment(_) => ErrorCode::InvalidAdjustment,
            AppError::AlreadyReturned(_) => ErrorCode::AlreadyReturned,
            AppError::Infrastructure(_) => ErrorCode::InfrastructureError,
        }
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status = match &self {
            AppError::OutOfStock(_) | AppError::NoCopyAvailable(_) => StatusCode::CONFLICT,
            AppError::DuplicateReservation { .. } => StatusCode::CONFLICT,
            AppError::InvalidState(_) | AppError::AlreadyReturned(_) => StatusCode::CONFLICT,
            AppError::ReasonRequired => StatusCode::BAD_REQUEST,
            AppError::UnknownCopy(_) | AppError::UnknownEntity { .. } => StatusCode::NOT_FOUND,
            AppError::InvalidAdjustment(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Infrastructure(msg) => {
                tracing::error!("Infrastructure error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_maps_to_a_nonzero_wire_code() {
        let errors = [
            AppError::OutOfStock(1),
            AppError::NoCopyAvailable(1),
            AppError::DuplicateReservation {
                user_id: 1,
                title_id: 2,
            },
            AppError::InvalidState("x".into()),
            AppError::ReasonRequired,
            AppError::UnknownCopy(1),
            AppError::UnknownEntity { kind: "title", id: 1 },
            AppError::InvalidAdjustment("x".into()),
            AppError::AlreadyReturned(1),
            AppError::Infrastructure("x".into()),
        ];
        for error in errors {
            assert_ne!(error.code() as u32, 0, "{}", error);
        }
    }
}
