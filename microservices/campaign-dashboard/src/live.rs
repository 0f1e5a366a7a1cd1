//! Registry of open live detail views
//!
//! Each open campaign detail view owns one [`StreamConnector`]. Closing the
//! view, or shutting the service down, closes the connector so no reconnect
//! loop outlives its view.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use pulse_core::{ApiEndpoints, CampaignId};
use pulse_stream::{ConnectorSettings, StreamConnector, StreamTransport, TimeRange};
use pulse_telemetry::Gauge;
use tracing::info;

use crate::views::LiveView;
use crate::{Error, Result};

/// Result of [`LiveViews::open`]
pub struct OpenedView {
    pub connector: Arc<StreamConnector>,
    /// False when a view for the campaign was already open
    pub created: bool,
}

pub struct LiveViews {
    endpoints: ApiEndpoints,
    transport: Arc<dyn StreamTransport>,
    settings: ConnectorSettings,
    views: DashMap<CampaignId, Arc<StreamConnector>>,
    open_views: Gauge,
}

impl LiveViews {
    pub fn new(
        endpoints: ApiEndpoints,
        transport: Arc<dyn StreamTransport>,
        settings: ConnectorSettings,
    ) -> Self {
        Self {
            endpoints,
            transport,
            settings,
            views: DashMap::new(),
            open_views: Gauge::new(),
        }
    }

    /// Start streaming `campaign_id`, or reuse the view already open for it.
    pub fn open(&self, campaign_id: &CampaignId) -> Result<OpenedView> {
        if campaign_id.is_empty() {
            return Err(Error::InvalidRequest("campaign id must not be empty".into()));
        }

        let opened = match self.views.entry(campaign_id.clone()) {
            Entry::Occupied(entry) => OpenedView {
                connector: Arc::clone(entry.get()),
                created: false,
            },
            Entry::Vacant(entry) => {
                let connector = Arc::new(StreamConnector::new(
                    self.endpoints.clone(),
                    Arc::clone(&self.transport),
                    self.settings.clone(),
                )?);
                connector.open(campaign_id.clone());
                entry.insert(Arc::clone(&connector));
                self.open_views.inc();
                info!(
                    campaign_id = %campaign_id,
                    open_views = self.open_views.get(),
                    "Live view opened"
                );
                OpenedView {
                    connector,
                    created: true,
                }
            }
        };

        Ok(opened)
    }

    /// Close the view for `campaign_id`. Returns whether one was open.
    pub fn close(&self, campaign_id: &CampaignId) -> bool {
        match self.views.remove(campaign_id) {
            Some((_, connector)) => {
                connector.close();
                self.open_views.dec();
                info!(
                    campaign_id = %campaign_id,
                    open_views = self.open_views.get(),
                    "Live view closed"
                );
                true
            }
            None => false,
        }
    }

    /// Current state of an open view. `range` defaults to the 24h window.
    pub fn view(
        &self,
        campaign_id: &CampaignId,
        range: Option<&str>,
        now: DateTime<Utc>,
    ) -> Option<LiveView> {
        let connector = self.views.get(campaign_id).map(|entry| Arc::clone(entry.value()))?;
        let range = range.unwrap_or_else(|| TimeRange::default().label());

        Some(LiveView::capture(
            campaign_id.clone(),
            connector.feed(),
            connector.stats().snapshot(),
            range,
            now,
        ))
    }

    pub fn close_all(&self) {
        let open: Vec<CampaignId> = self.views.iter().map(|entry| entry.key().clone()).collect();
        for campaign_id in open {
            self.close(&campaign_id);
        }
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}
