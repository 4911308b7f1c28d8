//! External fetcher boundary.
//!
//! Audio extraction and catalog search are not part of this server; they
//! are capabilities of an external fetcher service, reached through the
//! traits below. The core ledger never touches these.

mod client;
mod models;

pub use client::FetcherClient;
pub use models::{AudioStream, SearchResult};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("video {0} not found")]
    NotFound(String),
    /// Anything else: network failures, bad status codes, malformed
    /// payloads. The request layer translates this into a generic
    /// fetch-failed response.
    #[error("fetch failed: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Unavailable(err.to_string())
    }
}

/// Capability: given a video identifier, produce an audio byte stream plus
/// metadata, or fail.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch_audio(&self, video_id: &str) -> Result<AudioStream, FetchError>;
}

/// Capability: search the video platform's catalog.
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, FetchError>;
}
