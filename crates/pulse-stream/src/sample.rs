//! Decoding of stream payloads into metric samples

use pulse_core::MetricSample;

use crate::{Result, StreamError};

/// Decode one stream message.
///
/// The payload must be a JSON object carrying an RFC 3339 `timestamp`,
/// non-negative integer `impressions`, `clicks` and `conversions`, and a
/// finite non-negative `spend`. Extra fields are ignored.
pub fn decode_sample(payload: &str) -> Result<MetricSample> {
    let sample: MetricSample = serde_json::from_str(payload)?;

    if !sample.spend.is_finite() || sample.spend < 0.0 {
        return Err(StreamError::InvalidSample(format!(
            "spend must be a non-negative amount, got {}",
            sample.spend
        )));
    }

    Ok(sample)
}
