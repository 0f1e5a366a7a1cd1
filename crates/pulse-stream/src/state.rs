//! Connection state machine of a live subscription

use serde::{Deserialize, Serialize};

/// Where a connector's subscription currently stands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No subscription (no campaign, or closed)
    #[default]
    Idle,
    /// Subscription requested, transport not yet open
    Connecting,
    /// Transport open; samples are flowing
    Connected,
    /// Transport failed; a reconnect is scheduled
    Disconnected,
}

/// Transport and lifecycle signals that drive [`ConnectionState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// A subscription attempt starts
    Dial,
    /// The transport reported open
    Opened,
    /// The transport errored or ended
    Failed,
    /// The owner closed the connector
    Closed,
}

impl ConnectionState {
    /// Next state after `event`. Events that make no sense in the current
    /// state leave it unchanged.
    pub fn on(self, event: LinkEvent) -> ConnectionState {
        use ConnectionState::*;

        match (self, event) {
            (_, LinkEvent::Closed) => Idle,
            (Idle | Disconnected, LinkEvent::Dial) => Connecting,
            (Connecting, LinkEvent::Opened) => Connected,
            (Connecting | Connected, LinkEvent::Failed) => Disconnected,
            (state, _) => state,
        }
    }

    /// The "live" indicator shown next to the charts
    pub fn is_live(self) -> bool {
        self == ConnectionState::Connected
    }
}
