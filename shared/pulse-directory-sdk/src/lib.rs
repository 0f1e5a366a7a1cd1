//! Campaign Directory SDK
//!
//! Request/response client for the campaign listing and detail endpoints,
//! with a short-lived response cache in front of it.

mod cache;
mod client;
mod error;

pub use cache::ResponseCache;
pub use client::{DirectoryClient, DirectorySettings};
pub use error::{DirectoryError, Result};
