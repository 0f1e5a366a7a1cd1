//! Campaign API endpoint layout

use crate::domain::CampaignId;

/// Builds the URLs of the campaign API from a single base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    base_url: String,
}

impl ApiEndpoints {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base}/campaigns`
    pub fn campaigns(&self) -> String {
        format!("{}/campaigns", self.base_url)
    }

    /// `GET {base}/campaigns/{id}`
    pub fn campaign(&self, id: &CampaignId) -> String {
        format!("{}/campaigns/{}", self.base_url, id)
    }

    /// Server-push insights stream for one campaign
    pub fn insights_stream(&self, id: &CampaignId) -> String {
        format!("{}/campaigns/{}/insights/stream", self.base_url, id)
    }
}
