//! Onboarder Core
//!
//! Core types and the pipeline template compiler for the Onboarder service.
//!
//! This crate contains:
//! - Domain types: the onboarding request and the compiled pipeline
//! - Compiler: maps a validated request into a fully-specified pipeline
//! - DTOs: data transfer objects shared by the service, client and CLI
//!
//! Nothing in this crate performs I/O or reads process state. Deployment
//! settings arrive through [`config::PipelineConfig`] at construction time.

pub mod compiler;
pub mod config;
pub mod domain;
pub mod dto;
