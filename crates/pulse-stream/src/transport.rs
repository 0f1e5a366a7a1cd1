//! Server-push transport seam
//!
//! The connector only needs "give me the payload strings of one
//! subscription". [`SseTransport`] provides that over HTTP Server-Sent Events;
//! tests substitute a scripted transport.

use std::time::Duration;

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::stream::{BoxStream, StreamExt};
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use tracing::debug;

use crate::error::{Result, StreamError};

/// Payloads of one open subscription, in transport order. An `Err` item or the
/// end of the stream means the subscription is gone.
pub type PayloadStream = BoxStream<'static, Result<String>>;

/// Opens server-push subscriptions
#[async_trait]
pub trait StreamTransport: Send + Sync + 'static {
    /// Resolves once the subscription is open; the returned stream yields the
    /// data of each delivered message.
    async fn subscribe(&self, url: &str) -> Result<PayloadStream>;
}

const DEFAULT_EVENT: &str = "message";

/// Server-Sent Events over reqwest
#[derive(Debug, Clone)]
pub struct SseTransport {
    client: reqwest::Client,
}

impl SseTransport {
    pub fn new() -> Result<Self> {
        // No overall request timeout: the response body never ends by design.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| StreamError::Connect(e.to_string()))?;

        Ok(Self { client })
    }

}

#[async_trait]
impl StreamTransport for SseTransport {
    async fn subscribe(&self, url: &str) -> Result<PayloadStream> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| StreamError::Connect(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::Status(status.as_u16()));
        }

        let payloads = response
            .bytes_stream()
            .scan(LossyUtf8::default(), |decoder, chunk| {
                futures_util::future::ready(Some(chunk.map(|bytes| decoder.decode(&bytes))))
            })
            .eventsource()
            .filter_map(|item| {
                futures_util::future::ready(match item {
                    Ok(event) if event.event.is_empty() || event.event == DEFAULT_EVENT => {
                        Some(Ok(event.data))
                    }
                    Ok(event) => {
                        debug!(event = %event.event, "Ignoring named stream event");
                        None
                    }
                    Err(e) => Some(Err(StreamError::Transport(e.to_string()))),
                })
            })
            .boxed();

        Ok(payloads)
    }
}

/// Incremental UTF-8 decoding of a chunked body.
///
/// Invalid bytes become U+FFFD so one bad byte costs one message, not the
/// subscription. Only an incomplete sequence at the end of a chunk is carried
/// over to the next one.
#[derive(Debug, Default)]
struct LossyUtf8 {
    pending: Vec<u8>,
}

impl LossyUtf8 {
    fn decode(&mut self, chunk: &[u8]) -> String {
        let mut input = std::mem::take(&mut self.pending);
        input.extend_from_slice(chunk);

        let mut decoded = String::with_capacity(input.len());
        let mut rest = input.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    decoded.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    decoded.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(invalid) => {
                            decoded.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[invalid..];
                        }
                        None => {
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        decoded
    }
}
