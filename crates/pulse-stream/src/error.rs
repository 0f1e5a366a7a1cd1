//! Error types for the live stream

/// Result type alias
pub type Result<T> = std::result::Result<T, StreamError>;

/// Live stream errors. None of these are fatal to a connector: transport
/// failures lead to a scheduled reconnect, decode failures drop one message.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("Connection error: {0}")]
    Connect(String),

    #[error("Stream endpoint answered with status {0}")]
    Status(u16),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid sample: {0}")]
    InvalidSample(String),

    #[error("No async runtime available to drive the stream")]
    NoRuntime,
}
