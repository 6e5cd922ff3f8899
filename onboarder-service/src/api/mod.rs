//! API Module
//!
//! HTTP API layer for the onboarding service.
//! Each submodule handles endpoints for a specific concern.

pub mod error;
pub mod health;
pub mod project;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::service::OnboardingService;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub onboarding: Arc<OnboardingService>,
}

impl AppState {
    pub fn new(onboarding: OnboardingService) -> Self {
        Self {
            onboarding: Arc::new(onboarding),
        }
    }
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Onboarding
        .route("/project", post(project::create_project))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{PAYMENTS, RecordingScheduler, compiler};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use onboarder_core::dto::submission::{ErrorResponse, HealthStatus, SubmissionResult};
    use onboarder_scheduler::SubmissionError;
    use std::time::Duration;
    use tower::ServiceExt;

    fn router(scheduler: Arc<RecordingScheduler>) -> Router {
        let service = OnboardingService::new(compiler(), scheduler, Duration::from_secs(5));
        create_router(AppState::new(service))
    }

    fn post_project(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/project")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = router(Arc::new(RecordingScheduler::accepting()))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: HealthStatus = json(response).await;
        assert_eq!(body.status, "ok");
    }

    #[tokio::test]
    async fn test_create_project_returns_created() {
        let scheduler = Arc::new(RecordingScheduler::accepting());
        let response = router(scheduler.clone())
            .oneshot(post_project(PAYMENTS))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let result: SubmissionResult = json(response).await;
        assert_eq!(result.name, "payments-abcde");
        assert_eq!(result.namespace, "onboarding");
        assert_eq!(scheduler.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_request_is_bad_request() {
        let scheduler = Arc::new(RecordingScheduler::accepting());
        let response = router(scheduler.clone())
            .oneshot(post_project(
                r#"{"name":"Pay Ments","owner":"alice","team":"core","email":"a@x.com","cpu":2,"memory":4}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = json(response).await;
        assert_eq!(body.kind, "validation");
        assert!(!body.retryable);
        assert!(body.error.contains("name"));
        assert_eq!(scheduler.calls(), 0);
    }

    #[tokio::test]
    async fn test_transient_failure_is_service_unavailable() {
        let scheduler = Arc::new(RecordingScheduler::failing(SubmissionError::timed_out(
            Duration::from_secs(5),
        )));
        let response = router(scheduler.clone())
            .oneshot(post_project(PAYMENTS))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()[header::RETRY_AFTER], "5");
        let body: ErrorResponse = json(response).await;
        assert_eq!(body.kind, "submission_transient");
        assert!(body.retryable);
        assert_eq!(scheduler.calls(), 1);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_bad_gateway() {
        let scheduler = Arc::new(RecordingScheduler::failing(SubmissionError::permanent(
            "Forbidden (403): jobs.batch is forbidden",
        )));
        let response = router(scheduler)
            .oneshot(post_project(PAYMENTS))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
        let body: ErrorResponse = json(response).await;
        assert_eq!(body.kind, "submission_permanent");
        assert!(!body.retryable);
    }
}
