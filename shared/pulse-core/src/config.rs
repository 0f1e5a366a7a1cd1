//! Configuration management for Pulse services

use crate::error::{PulseError, Result};
use serde::Deserialize;
use std::env;
use std::net::SocketAddr;

/// Base URL of the campaign API used when `PULSE_API_BASE_URL` is unset.
pub const DEFAULT_API_BASE_URL: &str = "https://mixo-fe-backend-task.vercel.app";

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub service_name: String,
    pub http_bind: SocketAddr,
    pub api_base_url: String,
    pub log_level: String,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "campaign-dashboard".to_string()),
            http_bind: env::var("HTTP_BIND")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
                .parse()
                .map_err(|e| PulseError::Config(format!("Invalid HTTP_BIND: {}", e)))?,
            api_base_url: Self::validate_base_url(
                env::var("PULSE_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            )?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    fn validate_base_url(url: String) -> Result<String> {
        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(url)
        } else {
            Err(PulseError::Config(format!(
                "Invalid PULSE_API_BASE_URL: {} (expected http:// or https://)",
                url
            )))
        }
    }
}
