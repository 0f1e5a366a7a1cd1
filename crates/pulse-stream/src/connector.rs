//! Live Metric Stream Connector
//!
//! Owns at most one subscription at a time. The subscription runs as a
//! spawned session task that dials, pumps payloads into the feed, and on any
//! failure waits [`RECONNECT_DELAY`] before dialing again, forever. Closing
//! the connector retires the feed generation first and then aborts the task,
//! so once [`StreamConnector::close`] returns the buffer can no longer change.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use parking_lot::Mutex;
use pulse_core::{ApiEndpoints, CampaignId};
use pulse_telemetry::Counter;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::buffer::BUFFER_CAPACITY;
use crate::error::{Result, StreamError};
use crate::feed::MetricFeed;
use crate::sample::decode_sample;
use crate::state::LinkEvent;
use crate::transport::StreamTransport;

/// Fixed delay between a failure and the next dial
pub const RECONNECT_DELAY: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone)]
pub struct ConnectorSettings {
    pub reconnect_delay: Duration,
    pub buffer_capacity: usize,
}

impl Default for ConnectorSettings {
    fn default() -> Self {
        Self {
            reconnect_delay: RECONNECT_DELAY,
            buffer_capacity: BUFFER_CAPACITY,
        }
    }
}

/// Connector counters
#[derive(Debug, Clone, Default)]
pub struct StreamStats {
    pub samples_admitted: Counter,
    pub payloads_dropped: Counter,
    pub connection_attempts: Counter,
    pub reconnects_scheduled: Counter,
}

impl StreamStats {
    pub fn snapshot(&self) -> StreamStatsSnapshot {
        StreamStatsSnapshot {
            samples_admitted: self.samples_admitted.get(),
            payloads_dropped: self.payloads_dropped.get(),
            connection_attempts: self.connection_attempts.get(),
            reconnects_scheduled: self.reconnects_scheduled.get(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamStatsSnapshot {
    pub samples_admitted: u64,
    pub payloads_dropped: u64,
    pub connection_attempts: u64,
    pub reconnects_scheduled: u64,
}

struct ActiveSubscription {
    campaign_id: CampaignId,
    task: JoinHandle<()>,
}

/// Reconnecting subscription to one campaign's insights stream
pub struct StreamConnector {
    endpoints: ApiEndpoints,
    transport: Arc<dyn StreamTransport>,
    settings: ConnectorSettings,
    feed: MetricFeed,
    stats: StreamStats,
    runtime: Handle,
    active: Mutex<Option<ActiveSubscription>>,
}

impl StreamConnector {
    /// Must be called from within a tokio runtime; session tasks are spawned
    /// onto it.
    pub fn new(
        endpoints: ApiEndpoints,
        transport: Arc<dyn StreamTransport>,
        settings: ConnectorSettings,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| StreamError::NoRuntime)?;

        Ok(Self {
            endpoints,
            transport,
            feed: MetricFeed::new(settings.buffer_capacity),
            settings,
            stats: StreamStats::default(),
            runtime,
            active: Mutex::new(None),
        })
    }

    /// Subscribe to `campaign_id`, replacing any other subscription.
    ///
    /// Opening the id that is already subscribed does nothing. An empty id
    /// closes the current subscription and leaves the connector idle.
    pub fn open(&self, campaign_id: impl Into<CampaignId>) {
        let campaign_id = campaign_id.into();
        let mut active = self.active.lock();

        if campaign_id.is_empty() {
            Self::shutdown(&self.feed, active.take());
            return;
        }

        if let Some(current) = active.as_ref() {
            if current.campaign_id == campaign_id && !current.task.is_finished() {
                return;
            }
        }

        Self::shutdown(&self.feed, active.take());

        let generation = self.feed.begin(&campaign_id);
        let session = Session {
            url: self.endpoints.insights_stream(&campaign_id),
            campaign_id: campaign_id.clone(),
            generation,
            feed: self.feed.clone(),
            transport: Arc::clone(&self.transport),
            stats: self.stats.clone(),
            reconnect_delay: self.settings.reconnect_delay,
        };

        info!(campaign_id = %campaign_id, "Opening live stream");
        let task = self.runtime.spawn(session.run());
        *active = Some(ActiveSubscription { campaign_id, task });
    }

    /// Tear down the subscription and any pending reconnect. Safe to call
    /// any number of times.
    pub fn close(&self) {
        let mut active = self.active.lock();
        Self::shutdown(&self.feed, active.take());
    }

    fn shutdown(feed: &MetricFeed, subscription: Option<ActiveSubscription>) {
        if let Some(subscription) = subscription {
            feed.retire();
            subscription.task.abort();
            debug!(campaign_id = %subscription.campaign_id, "Live stream closed");
        }
    }

    pub fn feed(&self) -> &MetricFeed {
        &self.feed
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// Campaign of the current subscription
    pub fn campaign_id(&self) -> Option<CampaignId> {
        self.active.lock().as_ref().map(|a| a.campaign_id.clone())
    }

    pub fn is_open(&self) -> bool {
        self.active.lock().is_some()
    }
}

impl Drop for StreamConnector {
    fn drop(&mut self) {
        self.close();
    }
}

/// One subscription's dial / pump / back-off loop
struct Session {
    campaign_id: CampaignId,
    url: String,
    generation: u64,
    feed: MetricFeed,
    transport: Arc<dyn StreamTransport>,
    stats: StreamStats,
    reconnect_delay: Duration,
}

impl Session {
    async fn run(self) {
        loop {
            if !self.feed.apply(self.generation, LinkEvent::Dial) {
                return;
            }
            self.stats.connection_attempts.inc();

            match self.transport.subscribe(&self.url).await {
                Ok(payloads) => {
                    if !self.feed.apply(self.generation, LinkEvent::Opened) {
                        return;
                    }
                    info!(campaign_id = %self.campaign_id, "Live stream connected");

                    if !self.pump(payloads).await {
                        return;
                    }
                }
                Err(e) => {
                    warn!(
                        campaign_id = %self.campaign_id,
                        error = %e,
                        "Live stream connection failed"
                    );
                }
            }

            if !self.feed.apply(self.generation, LinkEvent::Failed) {
                return;
            }
            self.stats.reconnects_scheduled.inc();

            tokio::time::sleep(self.reconnect_delay).await;
            info!(campaign_id = %self.campaign_id, "Attempting to reconnect...");
        }
    }

    /// Feeds payloads into the buffer until the transport fails or ends.
    /// Returns false when the generation went stale underneath it.
    async fn pump(&self, mut payloads: crate::transport::PayloadStream) -> bool {
        while let Some(item) = payloads.next().await {
            match item {
                Ok(payload) => match decode_sample(&payload) {
                    Ok(sample) => {
                        if !self.feed.admit(self.generation, sample) {
                            return false;
                        }
                        self.stats.samples_admitted.inc();
                    }
                    Err(e) => {
                        self.stats.payloads_dropped.inc();
                        warn!(
                            campaign_id = %self.campaign_id,
                            error = %e,
                            "Dropping malformed stream payload"
                        );
                    }
                },
                Err(e) => {
                    warn!(
                        campaign_id = %self.campaign_id,
                        error = %e,
                        "Live stream transport error"
                    );
                    return true;
                }
            }
        }

        debug!(campaign_id = %self.campaign_id, "Live stream ended by server");
        true
    }
}
