//! Service Module
//!
//! Business logic layer for the onboarding service.
//! Services orchestrate between the compiler and the scheduler adapter.

pub mod onboarding;

// Re-export for convenience
pub use onboarding as onboarding_service;
pub use onboarding::OnboardingService;
