//! Response payloads and error mapping.
//!
//! # Responsibilities
//! - Wrap successful results as `{"result": ...}`
//! - Map domain errors to HTTP status codes
//! - Render todo errors as `{"errorMessage": ...}` and log-level errors as text

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::observability::logging::LoggingError;
use crate::todo::TodoError;

/// Successful JSON payload.
#[derive(Debug, Serialize)]
pub struct ResultBody<T> {
    pub result: T,
}

impl<T> ResultBody<T> {
    pub fn new(result: T) -> Json<Self> {
        Json(Self { result })
    }
}

/// Failed JSON payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error_message: String,
}

/// Any failure a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Todo(#[from] TodoError),

    #[error(transparent)]
    Logging(#[from] LoggingError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Todo(TodoError::DuplicateTitle(_) | TodoError::PastDueDate) => {
                StatusCode::CONFLICT
            }
            ApiError::Todo(TodoError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Todo(
                TodoError::InvalidFilter(_)
                | TodoError::InvalidSortKey(_)
                | TodoError::InvalidStatus(_)
                | TodoError::InvalidInput(_),
            ) => StatusCode::BAD_REQUEST,
            ApiError::Logging(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Todo(e) => (
                status,
                Json(ErrorBody {
                    error_message: e.to_string(),
                }),
            )
                .into_response(),
            ApiError::Logging(e) => (status, format!("errorMessage: {}", e)).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (TodoError::DuplicateTitle("a".into()), StatusCode::CONFLICT),
            (TodoError::PastDueDate, StatusCode::CONFLICT),
            (TodoError::InvalidFilter("x".into()), StatusCode::BAD_REQUEST),
            (TodoError::InvalidSortKey("x".into()), StatusCode::BAD_REQUEST),
            (TodoError::InvalidStatus("x".into()), StatusCode::BAD_REQUEST),
            (TodoError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (TodoError::NotFound("1".into()), StatusCode::NOT_FOUND),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
        assert_eq!(
            ApiError::from(LoggingError::InvalidLevel("WARN".into())).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_error_body_shape() {
        let body = ErrorBody {
            error_message: "Error: Invalid input".into(),
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            serde_json::json!({ "errorMessage": "Error: Invalid input" })
        );
    }
}
