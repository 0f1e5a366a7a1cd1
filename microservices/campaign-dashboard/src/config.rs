//! Configuration for the campaign dashboard

use std::time::Duration;

use pulse_core::{ApiEndpoints, ServiceConfig};
use pulse_directory_sdk::DirectorySettings;
use pulse_stream::ConnectorSettings;

/// Dashboard configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address, API base URL and log level
    pub service: ServiceConfig,
    /// Directory request timeout and cache TTL
    pub directory: DirectorySettings,
    /// Reconnect delay and buffer capacity of every live view
    pub connector: ConnectorSettings,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let service = ServiceConfig::from_env()?;

        let mut directory = DirectorySettings::default();
        if let Some(secs) = env_secs("DIRECTORY_TIMEOUT_SECS")? {
            directory.request_timeout = secs;
        }
        if let Some(secs) = env_secs("DIRECTORY_CACHE_TTL_SECS")? {
            directory.cache_ttl = secs;
        }

        Ok(Self {
            service,
            directory,
            connector: ConnectorSettings::default(),
        })
    }

    pub fn endpoints(&self) -> ApiEndpoints {
        ApiEndpoints::new(&self.service.api_base_url)
    }
}

fn env_secs(name: &str) -> anyhow::Result<Option<Duration>> {
    match std::env::var(name) {
        Ok(value) => parse_secs(name, &value).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_secs(name: &str, value: &str) -> anyhow::Result<Duration> {
    let secs: u64 = value
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid {}: {}", name, e))?;
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_secs() {
        assert_eq!(parse_secs("X", "15").unwrap(), Duration::from_secs(15));
        assert_eq!(parse_secs("X", " 2 ").unwrap(), Duration::from_secs(2));
        assert!(parse_secs("X", "ten").is_err());
        assert!(parse_secs("X", "-1").is_err());
    }
}
