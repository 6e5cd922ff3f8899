//! Core domain types
//!
//! The onboarding request accepted from callers and the pipeline the
//! compiler produces from it. Both are plain data: validation lives with the
//! request, step wiring lives in the compiler.

pub mod pipeline;
pub mod request;
