//! Error types for the campaign dashboard

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pulse_directory_sdk::DirectoryError;
use pulse_stream::StreamError;
use serde_json::json;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Dashboard error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Campaign not found: {0}")]
    CampaignNotFound(String),

    #[error("Live view not open: {0}")]
    LiveViewNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::CampaignNotFound(_) | Error::LiveViewNotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::Directory(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Error::Directory(DirectoryError::InvalidId) => StatusCode::BAD_REQUEST,
            Error::Directory(_) => StatusCode::BAD_GATEWAY,
            Error::Stream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!("Request failed: {:?}", self);
            match status {
                StatusCode::BAD_GATEWAY => "Campaign directory unavailable".to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}
