//! Project API Handlers
//!
//! HTTP endpoint for project onboarding.

use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use onboarder_core::dto::submission::SubmissionResult;

use crate::api::AppState;
use crate::api::error::ApiResult;

/// POST /project
/// Onboard a project
///
/// The body is read raw so that every rejection goes through the request
/// model and comes back as a structured validation error.
pub async fn create_project(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<SubmissionResult>)> {
    tracing::info!("Onboarding request received ({} bytes)", body.len());

    let result = state.onboarding.onboard(&body).await?;

    Ok((StatusCode::CREATED, Json(result)))
}
