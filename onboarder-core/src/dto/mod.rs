//! Data Transfer Objects for inter-service communication
//!
//! Bodies exchanged between the onboarding service, its HTTP client and the
//! scheduler adapters.

pub mod submission;
