//! Read models served to the dashboard pages

use chrono::{DateTime, Utc};
use pulse_core::{Campaign, CampaignId, CampaignList, CampaignStatus, MetricSample};
use pulse_stream::{ConnectionState, MetricFeed, StreamStatsSnapshot};
use serde::Serialize;

/// How many campaigns the overview lists as "recent"
pub const RECENT_CAMPAIGNS: usize = 5;

/// Number of campaigns running on one platform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformShare {
    pub platform: String,
    pub campaigns: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentCampaign {
    pub id: CampaignId,
    pub name: String,
    pub status: CampaignStatus,
    pub platforms: Vec<String>,
    pub daily_budget: f64,
}

/// Aggregates shown on the dashboard landing page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardOverview {
    pub total_campaigns: u64,
    pub active_campaigns: u64,
    pub total_budget: f64,
    pub platform_distribution: Vec<PlatformShare>,
    pub recent_campaigns: Vec<RecentCampaign>,
}

impl DashboardOverview {
    pub fn from_listing(listing: &CampaignList) -> Self {
        let mut platform_distribution: Vec<PlatformShare> = Vec::new();
        for platform in listing.campaigns.iter().flat_map(|c| c.platforms.iter()) {
            let name = capitalize(platform);
            match platform_distribution.iter_mut().find(|s| s.platform == name) {
                Some(share) => share.campaigns += 1,
                None => platform_distribution.push(PlatformShare {
                    platform: name,
                    campaigns: 1,
                }),
            }
        }

        Self {
            total_campaigns: listing.total,
            active_campaigns: listing
                .campaigns
                .iter()
                .filter(|c| c.status == CampaignStatus::Active)
                .count() as u64,
            total_budget: listing.campaigns.iter().map(|c| c.budget).sum(),
            platform_distribution,
            recent_campaigns: listing
                .campaigns
                .iter()
                .take(RECENT_CAMPAIGNS)
                .map(|c| RecentCampaign {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    status: c.status,
                    platforms: c.platforms.clone(),
                    daily_budget: c.daily_budget,
                })
                .collect(),
        }
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Status half of the campaign list filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(CampaignStatus),
}

impl StatusFilter {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "" | "all" => Some(Self::All),
            other => CampaignStatus::parse(other).map(Self::Only),
        }
    }

    fn admits(&self, status: CampaignStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }
}

/// Search box plus status dropdown of the campaign list page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignFilter {
    search: String,
    status: StatusFilter,
}

impl CampaignFilter {
    pub fn new(search: &str, status: StatusFilter) -> Self {
        Self {
            search: search.trim().to_lowercase(),
            status,
        }
    }

    /// Name or any platform contains the search text (case-insensitive), and
    /// the status is admitted.
    pub fn matches(&self, campaign: &Campaign) -> bool {
        let text_match = self.search.is_empty()
            || campaign.name.to_lowercase().contains(&self.search)
            || campaign
                .platforms
                .iter()
                .any(|p| p.to_lowercase().contains(&self.search));

        text_match && self.status.admits(campaign.status)
    }

    pub fn apply(&self, campaigns: &[Campaign]) -> Vec<Campaign> {
        campaigns.iter().filter(|c| self.matches(c)).cloned().collect()
    }
}

/// Detail page payload: live indicator, headline numbers and chart series
#[derive(Debug, Clone, Serialize)]
pub struct LiveView {
    pub campaign_id: CampaignId,
    pub connection: ConnectionState,
    pub live: bool,
    pub latest: MetricSample,
    pub range: String,
    pub samples: Vec<MetricSample>,
    pub stats: StreamStatsSnapshot,
}

impl LiveView {
    pub fn capture(
        campaign_id: CampaignId,
        feed: &MetricFeed,
        stats: StreamStatsSnapshot,
        range: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let connection = feed.connection_state();
        Self {
            campaign_id,
            connection,
            live: connection.is_live(),
            latest: feed.latest(),
            range: range.to_string(),
            samples: feed.window(range, now),
            stats,
        }
    }
}
