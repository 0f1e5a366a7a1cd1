//! Campaign Directory Client

use std::time::Duration;

use pulse_core::{ApiEndpoints, Campaign, CampaignId, CampaignList};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::cache::ResponseCache;
use crate::{DirectoryError, Result};

/// Client tuning
#[derive(Debug, Clone)]
pub struct DirectorySettings {
    pub request_timeout: Duration,
    pub cache_ttl: Duration,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(30),
        }
    }
}

/// `GET {base}/campaigns/{id}` wraps the record in `{ campaign: ... }`
#[derive(Debug, Deserialize)]
struct CampaignEnvelope {
    campaign: Campaign,
}

/// HTTP client for the campaign listing and detail endpoints
pub struct DirectoryClient {
    client: Client,
    endpoints: ApiEndpoints,
    cache: ResponseCache,
}

impl DirectoryClient {
    pub fn new(endpoints: ApiEndpoints) -> Result<Self> {
        Self::with_settings(endpoints, DirectorySettings::default())
    }

    pub fn with_settings(endpoints: ApiEndpoints, settings: DirectorySettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()?;

        Ok(Self {
            client,
            endpoints,
            cache: ResponseCache::new(settings.cache_ttl),
        })
    }

    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    /// Fetch the campaign listing
    pub async fn list_campaigns(&self) -> Result<CampaignList> {
        if let Some(list) = self.cache.listing() {
            return Ok(list);
        }

        let url = self.endpoints.campaigns();
        debug!(url = %url, "Fetching campaign listing");

        let body = self.fetch(&url, "Failed to fetch campaigns").await?;
        let list = decode_listing(&body)?;

        self.cache.store_listing(list.clone());
        Ok(list)
    }

    /// Fetch one campaign record
    pub async fn get_campaign(&self, id: &CampaignId) -> Result<Campaign> {
        if id.is_empty() {
            return Err(DirectoryError::InvalidId);
        }
        if let Some(campaign) = self.cache.campaign(id) {
            return Ok(campaign);
        }

        let url = self.endpoints.campaign(id);
        debug!(campaign_id = %id, "Fetching campaign details");

        let body = self.fetch(&url, "Failed to fetch campaign details").await?;
        let campaign = decode_campaign(&body)?;

        self.cache.store_campaign(campaign.clone());
        Ok(campaign)
    }

    /// Forget cached responses
    pub fn invalidate(&self) {
        self.cache.clear();
    }

    async fn fetch(&self, url: &str, context: &'static str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                context,
            });
        }

        Ok(response.text().await?)
    }
}

fn decode_listing(body: &str) -> Result<CampaignList> {
    Ok(serde_json::from_str(body)?)
}

fn decode_campaign(body: &str) -> Result<Campaign> {
    let envelope: CampaignEnvelope = serde_json::from_str(body)?;
    Ok(envelope.campaign)
}
