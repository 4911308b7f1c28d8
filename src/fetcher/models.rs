//! Models for the external fetcher service API.

use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use super::FetchError;

/// A search hit from the video platform's catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    pub video_id: String,
    pub title: String,
    pub artist: String,
    pub duration: String,
    pub thumbnail: String,
}

/// An audio stream handed back by the fetcher, ready to be proxied to the
/// client.
pub struct AudioStream {
    pub file_name: String,
    pub content_type: String,
    pub bytes: BoxStream<'static, Result<Bytes, FetchError>>,
}
