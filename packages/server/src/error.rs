//! Mapping of request failures onto HTTP responses.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use quake_risk_database::DbError;
use quake_risk_database_models::InvalidRangeError;
use quake_risk_event_models::{InvalidCoordinateError, InvalidSeverityError};
use quake_risk_server_models::ApiMessage;

/// Errors a handler can return. Each produces exactly one JSON response
/// with a `message` field.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or out-of-range input.
    #[error("{0}")]
    Validation(String),

    /// Repository failure.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Repository call exceeded its time budget.
    #[error("Repository call timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// The blocking worker running a repository call failed.
    #[error("Blocking task failed: {0}")]
    Blocking(#[from] actix_web::error::BlockingError),
}

impl From<InvalidCoordinateError> for ApiError {
    fn from(e: InvalidCoordinateError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<InvalidSeverityError> for ApiError {
    fn from(e: InvalidSeverityError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<InvalidRangeError> for ApiError {
    fn from(e: InvalidRangeError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Timeout { .. } | Self::Blocking(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            Self::Validation(message) => message.clone(),
            _ => {
                log::error!("Request failed: {self}");
                "Internal Server Error".to_string()
            }
        };

        HttpResponse::build(self.status_code()).json(ApiMessage::new(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_is_bad_request() {
        let err = ApiError::from(InvalidCoordinateError::Latitude(95.0));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn repository_failures_are_server_errors() {
        let err = ApiError::Timeout { timeout_ms: 5 };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let err = ApiError::from(DbError::LockPoisoned);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
