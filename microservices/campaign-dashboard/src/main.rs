//! Campaign Dashboard Microservice
//!
//! Backend for the campaign dashboard pages:
//! - Overview aggregates over the campaign directory
//! - Campaign listing with search and status filters
//! - Live campaign detail views fed by the insights stream

mod config;
mod error;
mod handlers;
mod live;
mod routes;
mod views;

use std::sync::Arc;
use std::time::Instant;

use pulse_core::{
    DependencyStatus, HealthStatus, PulseError, PulseService, ReadinessStatus, ServiceRuntime,
};
use pulse_directory_sdk::DirectoryClient;
use pulse_stream::{SseTransport, StreamTransport};
use tokio::net::TcpListener;
use tracing::{info, warn};

pub use config::Config;
pub use error::{Error, Result};
use live::LiveViews;

const SERVICE_ID: &str = "campaign-dashboard";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<DirectoryClient>,
    pub live: Arc<LiveViews>,
    pub started: Instant,
}

impl AppState {
    pub fn build(config: &Config, transport: Arc<dyn StreamTransport>) -> Result<Self> {
        let endpoints = config.endpoints();
        let directory =
            DirectoryClient::with_settings(endpoints.clone(), config.directory.clone())?;
        let live = LiveViews::new(endpoints, transport, config.connector.clone());

        Ok(Self {
            directory: Arc::new(directory),
            live: Arc::new(live),
            started: Instant::now(),
        })
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            healthy: true,
            service_id: SERVICE_ID.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.started.elapsed().as_secs(),
        }
    }

    /// Ready once the campaign directory answers
    pub async fn readiness(&self) -> ReadinessStatus {
        let probe_start = Instant::now();
        let available = match self.directory.list_campaigns().await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Campaign directory probe failed");
                false
            }
        };

        ReadinessStatus {
            ready: available,
            dependencies: vec![DependencyStatus {
                name: "campaign-directory".to_string(),
                available,
                latency_ms: Some(probe_start.elapsed().as_millis() as u64),
            }],
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    pulse_telemetry::init(&config.service.service_name)?;

    info!(log_level = %config.service.log_level, "Starting Campaign Dashboard microservice");

    let service = Arc::new(DashboardService::new(config)?);
    ServiceRuntime::run(service).await?;

    Ok(())
}

/// Dashboard service implementation
pub struct DashboardService {
    config: Config,
    state: AppState,
}

impl DashboardService {
    pub fn new(config: Config) -> Result<Self> {
        let transport = Arc::new(SseTransport::new()?);
        let state = AppState::build(&config, transport)?;

        info!(
            api_base_url = %config.service.api_base_url,
            reconnect_delay_ms = config.connector.reconnect_delay.as_millis() as u64,
            buffer_capacity = config.connector.buffer_capacity,
            "Initializing campaign dashboard"
        );

        Ok(Self { config, state })
    }
}

#[async_trait::async_trait]
impl PulseService for DashboardService {
    fn service_id(&self) -> &'static str {
        SERVICE_ID
    }

    async fn health(&self) -> HealthStatus {
        self.state.health()
    }

    async fn ready(&self) -> ReadinessStatus {
        self.state.readiness().await
    }

    async fn shutdown(&self) -> pulse_core::Result<()> {
        info!(open_views = self.state.live.len(), "Closing live views");
        self.state.live.close_all();
        Ok(())
    }

    async fn start(&self) -> pulse_core::Result<()> {
        let bind_addr = self.config.service.http_bind;
        let app = routes::create_router(self.state.clone());

        let listener = TcpListener::bind(bind_addr).await?;
        info!("Campaign Dashboard listening on {}", bind_addr);

        axum::serve(listener, app)
            .await
            .map_err(|e| PulseError::Internal(format!("HTTP server error: {}", e)))?;

        Ok(())
    }
}
