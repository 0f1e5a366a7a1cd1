//! Pulse Core - Shared domain types and service infrastructure
//!
//! This crate provides:
//! - Campaign and live metric domain types
//! - The campaign API endpoint layout
//! - Error handling utilities
//! - Configuration management
//! - Standard service trait and runtime bootstrap

pub mod config;
pub mod domain;
pub mod endpoints;
pub mod error;
pub mod service;

pub use config::{ServiceConfig, DEFAULT_API_BASE_URL};
pub use domain::*;
pub use endpoints::ApiEndpoints;
pub use error::{PulseError, Result};
pub use service::{DependencyStatus, HealthStatus, PulseService, ReadinessStatus, ServiceRuntime};
