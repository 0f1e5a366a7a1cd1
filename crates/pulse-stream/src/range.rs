//! Range Filter: recency windows over buffered samples

use std::fmt;

use chrono::{DateTime, Utc};
use pulse_core::MetricSample;
use serde::{Deserialize, Serialize};

const HOUR_MS: i64 = 60 * 60 * 1000;

/// Named recency window offered by the detail view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1h")]
    LastHour,
    #[default]
    #[serde(rename = "24h")]
    LastDay,
    #[serde(rename = "7d")]
    LastWeek,
    #[serde(rename = "30d")]
    LastMonth,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::LastHour,
        TimeRange::LastDay,
        TimeRange::LastWeek,
        TimeRange::LastMonth,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::LastHour => "1h",
            Self::LastDay => "24h",
            Self::LastWeek => "7d",
            Self::LastMonth => "30d",
        }
    }

    pub fn duration_ms(&self) -> i64 {
        match self {
            Self::LastHour => HOUR_MS,
            Self::LastDay => 24 * HOUR_MS,
            Self::LastWeek => 7 * 24 * HOUR_MS,
            Self::LastMonth => 30 * 24 * HOUR_MS,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|range| range.label() == label)
    }

    /// True when `timestamp` is no older than this window at `now`.
    /// Future timestamps always qualify.
    pub fn contains(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        (now - timestamp).num_milliseconds() <= self.duration_ms()
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Samples whose age at `now` is within the window named by `range_label`,
/// in input order. An unrecognised label is an unbounded window.
pub fn filter_samples(
    samples: &[MetricSample],
    range_label: &str,
    now: DateTime<Utc>,
) -> Vec<MetricSample> {
    match TimeRange::from_label(range_label) {
        Some(range) => samples
            .iter()
            .filter(|sample| range.contains(sample.timestamp, now))
            .cloned()
            .collect(),
        None => samples.to_vec(),
    }
}
