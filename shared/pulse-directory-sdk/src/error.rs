//! Error types for the directory SDK

/// Result type alias
pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Directory client errors
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{context} (status {status})")]
    Status { status: u16, context: &'static str },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Campaign id must not be empty")]
    InvalidId,
}

impl DirectoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}
