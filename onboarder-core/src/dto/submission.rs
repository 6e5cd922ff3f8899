//! Submission DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a workload the scheduler accepted
///
/// Returned to the caller verbatim as the body of a successful onboarding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    /// Scheduler-generated workload name
    pub name: String,
    pub namespace: String,
    /// Creation time reported by the scheduler, if it reported one
    pub created_at: Option<DateTime<Utc>>,
}

/// Structured error body returned by the onboarding endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Stable machine-readable tag, e.g. `validation`
    pub kind: String,
    pub retryable: bool,
}

/// Liveness report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}
