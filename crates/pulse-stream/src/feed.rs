//! Shared read side of a connector
//!
//! The connector's session task is the only writer. Every write carries the
//! generation it was started under and is discarded once the connector has
//! moved on (closed or reopened), so a stale task can never touch the buffer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use pulse_core::{CampaignId, MetricSample};
use tokio::sync::watch;

use crate::buffer::RollingBuffer;
use crate::range::filter_samples;
use crate::state::{ConnectionState, LinkEvent};

#[derive(Debug)]
struct FeedState {
    generation: u64,
    campaign_id: Option<CampaignId>,
    buffer: RollingBuffer,
    connection: ConnectionState,
}

/// Cloneable handle onto the buffer and connection state of one connector
#[derive(Debug, Clone)]
pub struct MetricFeed {
    state: Arc<Mutex<FeedState>>,
    connection_tx: Arc<watch::Sender<ConnectionState>>,
    capacity: usize,
}

impl MetricFeed {
    pub(crate) fn new(capacity: usize) -> Self {
        let (connection_tx, _) = watch::channel(ConnectionState::Idle);
        Self {
            state: Arc::new(Mutex::new(FeedState {
                generation: 0,
                campaign_id: None,
                buffer: RollingBuffer::new(capacity),
                connection: ConnectionState::Idle,
            })),
            connection_tx: Arc::new(connection_tx),
            capacity,
        }
    }

    /// Starts a new generation for `campaign_id`. The buffer is replaced only
    /// when the campaign changes.
    pub(crate) fn begin(&self, campaign_id: &CampaignId) -> u64 {
        let mut state = self.state.lock();
        state.generation += 1;
        if state.campaign_id.as_ref() != Some(campaign_id) {
            state.buffer = RollingBuffer::new(self.capacity);
            state.campaign_id = Some(campaign_id.clone());
        }
        self.set_connection(&mut state, ConnectionState::Idle);
        state.generation
    }

    /// Invalidates the running generation and returns to `Idle`.
    pub(crate) fn retire(&self) {
        let mut state = self.state.lock();
        state.generation += 1;
        let next = state.connection.on(LinkEvent::Closed);
        self.set_connection(&mut state, next);
    }

    /// Applies a link event for `generation`; false once that generation is stale.
    pub(crate) fn apply(&self, generation: u64, event: LinkEvent) -> bool {
        let mut state = self.state.lock();
        if state.generation != generation {
            return false;
        }
        let next = state.connection.on(event);
        self.set_connection(&mut state, next);
        true
    }

    /// Appends a sample for `generation`; false once that generation is stale.
    pub(crate) fn admit(&self, generation: u64, sample: MetricSample) -> bool {
        let mut state = self.state.lock();
        if state.generation != generation {
            return false;
        }
        state.buffer.append(sample);
        true
    }

    fn set_connection(&self, state: &mut FeedState, next: ConnectionState) {
        if state.connection != next {
            state.connection = next;
            self.connection_tx.send_replace(next);
        }
    }

    /// Owned copy of the buffer, oldest first
    pub fn snapshot(&self) -> Vec<MetricSample> {
        self.state.lock().buffer.snapshot()
    }

    /// Most recent sample, or the zero sample
    pub fn latest(&self) -> MetricSample {
        self.state.lock().buffer.latest()
    }

    pub fn len(&self) -> usize {
        self.state.lock().buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().buffer.is_empty()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state.lock().connection
    }

    /// Watch connection state changes
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.connection_tx.subscribe()
    }

    /// Campaign whose samples the buffer holds, if any was ever opened
    pub fn campaign_id(&self) -> Option<CampaignId> {
        self.state.lock().campaign_id.clone()
    }

    /// Snapshot narrowed to the window named by `range_label` at `now`
    pub fn window(&self, range_label: &str, now: DateTime<Utc>) -> Vec<MetricSample> {
        filter_samples(&self.snapshot(), range_label, now)
    }
}
