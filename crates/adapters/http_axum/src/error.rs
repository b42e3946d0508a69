//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use rate_domain::error::{ForecastError, RateError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`RateError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(RateError);

impl From<RateError> for ApiError {
    fn from(err: RateError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(RateError::Validation(err))
    }
}

fn internal(err: &dyn std::error::Error, kind: &'static str) -> (StatusCode, String) {
    tracing::error!(error = %err, kind, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal server error".to_string(),
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            RateError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            RateError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            RateError::Conflict(err) => (StatusCode::CONFLICT, err.to_string()),
            RateError::Forecast(err @ ForecastError::InsufficientHistory { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            RateError::Forecast(err @ ForecastError::ModelUnavailable) => {
                (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
            }
            RateError::Forecast(err @ ForecastError::ShapeMismatch { .. }) => {
                internal(err, "forecast")
            }
            RateError::Storage(err) => internal(&**err, "storage"),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
