use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use validator::ValidationErrors;

use crate::db::StoreError;

pub const CONFLICT_MESSAGE: &str = "item with this name already exists";
pub const NOT_FOUND_MESSAGE: &str = "item not found";
pub const INTERNAL_MESSAGE: &str = "internal server error";

/// Errors a handler can answer with. Every variant renders as
/// `{"error": "<message>"}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    #[error("{}", CONFLICT_MESSAGE)]
    Conflict,

    /// Carries only the caller-facing message; the cause is logged where it occurs.
    #[error("{0}")]
    Internal(&'static str),
}

impl AppError {
    /// Converts a store failure, logging what the caller will not see.
    /// `internal_message` is what a storage failure is reported as.
    pub fn from_store(err: StoreError, internal_message: &'static str) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound,
            StoreError::Conflict => {
                tracing::warn!("rejected write: item name already in use");
                AppError::Conflict
            }
            StoreError::InvalidInput(message) => AppError::BadRequest(message),
            StoreError::Internal(source) => {
                tracing::error!(error = %source, "{}", internal_message);
                AppError::Internal(internal_message)
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::from_store(err, INTERNAL_MESSAGE)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::BadRequest(describe_validation_errors(&errors))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Renders field errors as `field: message` pairs, sorted by field name.
fn describe_validation_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |error| match &error.message {
                Some(message) => format!("{}: {}", field, message),
                None => format!("{}: failed {} check", field, error.code),
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::BadRequest("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Internal(INTERNAL_MESSAGE).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_errors_map_to_tagged_variants() {
        assert!(matches!(
            AppError::from(StoreError::NotFound),
            AppError::NotFound
        ));
        assert!(matches!(
            AppError::from(StoreError::Conflict),
            AppError::Conflict
        ));
        assert!(matches!(
            AppError::from(StoreError::InvalidInput("bad".to_string())),
            AppError::BadRequest(msg) if msg == "bad"
        ));
    }

    #[test]
    fn test_internal_error_hides_cause() {
        let err = AppError::from_store(
            StoreError::Internal(sqlx::Error::PoolTimedOut),
            "failed to fetch items",
        );
        assert_eq!(err.to_string(), "failed to fetch items");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_errors_are_described_per_field() {
        let mut errors = ValidationErrors::new();
        let mut quantity = ValidationError::new("range");
        quantity.message = Some("quantity must be greater than zero".into());
        errors.add("quantity", quantity);
        errors.add("name", ValidationError::new("required"));

        assert_eq!(
            describe_validation_errors(&errors),
            "name: failed required check; quantity: quantity must be greater than zero"
        );
    }
}
