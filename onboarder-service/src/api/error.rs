//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use onboarder_core::dto::submission::ErrorResponse;

use crate::service::onboarding_service::OnboardingError;

/// Seconds a caller should wait before retrying a transient failure
const RETRY_AFTER_SECS: &str = "5";

/// API error type
#[derive(Debug)]
pub enum ApiError {
    /// Request rejected before any side effect
    BadRequest { kind: &'static str, message: String },
    /// Scheduler could not be reached in time; retryable
    Unavailable { kind: &'static str, message: String },
    /// Scheduler refused the workload
    BadGateway { kind: &'static str, message: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message, retryable) = match self {
            ApiError::BadRequest { kind, message } => {
                (StatusCode::BAD_REQUEST, kind, message, false)
            }
            ApiError::Unavailable { kind, message } => {
                tracing::error!("Scheduler unavailable: {}", message);
                (StatusCode::SERVICE_UNAVAILABLE, kind, message, true)
            }
            ApiError::BadGateway { kind, message } => {
                tracing::error!("Scheduler rejected pipeline: {}", message);
                (StatusCode::BAD_GATEWAY, kind, message, false)
            }
        };

        let body = ErrorResponse {
            error: message,
            kind: kind.to_string(),
            retryable,
        };

        let mut response = (status, Json(body)).into_response();
        if retryable {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static(RETRY_AFTER_SECS));
        }
        response
    }
}

impl From<OnboardingError> for ApiError {
    fn from(err: OnboardingError) -> Self {
        let kind = err.kind();
        let message = err.message();

        match err {
            OnboardingError::Validation(_) => ApiError::BadRequest { kind, message },
            OnboardingError::Submission(_) if err.is_retryable() => {
                ApiError::Unavailable { kind, message }
            }
            OnboardingError::Submission(_) => ApiError::BadGateway { kind, message },
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
