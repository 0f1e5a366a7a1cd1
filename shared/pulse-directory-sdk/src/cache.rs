//! TTL cache for directory responses

use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;
use pulse_core::{Campaign, CampaignId, CampaignList};

/// Holds the last listing and individual campaign records for `ttl`.
pub struct ResponseCache {
    listing: Mutex<Option<(CampaignList, Instant)>>,
    campaigns: DashMap<CampaignId, (Campaign, Instant)>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            listing: Mutex::new(None),
            campaigns: DashMap::new(),
            ttl,
        }
    }

    /// Cached listing if not expired
    pub fn listing(&self) -> Option<CampaignList> {
        let guard = self.listing.lock();
        guard
            .as_ref()
            .filter(|(_, inserted)| inserted.elapsed() < self.ttl)
            .map(|(list, _)| list.clone())
    }

    pub fn store_listing(&self, list: CampaignList) {
        *self.listing.lock() = Some((list, Instant::now()));
    }

    /// Cached campaign if not expired
    pub fn campaign(&self, id: &CampaignId) -> Option<Campaign> {
        self.campaigns.get(id).and_then(|entry| {
            if entry.1.elapsed() < self.ttl {
                Some(entry.0.clone())
            } else {
                None
            }
        })
    }

    /// Expired entries are pruned on every store.
    pub fn store_campaign(&self, campaign: Campaign) {
        self.prune();
        self.campaigns
            .insert(campaign.id.clone(), (campaign, Instant::now()));
    }

    /// Drop every cached response
    pub fn clear(&self) {
        *self.listing.lock() = None;
        self.campaigns.clear();
    }

    /// Drop expired campaign entries
    pub fn prune(&self) {
        self.campaigns
            .retain(|_, (_, inserted)| inserted.elapsed() < self.ttl);
    }

    pub fn len(&self) -> usize {
        self.campaigns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty()
    }
}
