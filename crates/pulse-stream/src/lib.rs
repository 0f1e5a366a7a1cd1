//! Live campaign insight streaming
//!
//! One [`StreamConnector`] owns at most one server-push subscription for the
//! campaign currently on screen. Decoded samples land in a bounded
//! [`RollingBuffer`] shared through a [`MetricFeed`]; readers take consistent
//! snapshots and narrow them with [`filter_samples`] against an explicit "now".

mod buffer;
mod connector;
mod error;
mod feed;
mod range;
mod sample;
mod state;
mod transport;

pub use buffer::{RollingBuffer, BUFFER_CAPACITY};
pub use connector::{
    ConnectorSettings, StreamConnector, StreamStats, StreamStatsSnapshot, RECONNECT_DELAY,
};
pub use error::{Result, StreamError};
pub use feed::MetricFeed;
pub use range::{filter_samples, TimeRange};
pub use sample::decode_sample;
pub use state::{ConnectionState, LinkEvent};
pub use transport::{PayloadStream, SseTransport, StreamTransport};
