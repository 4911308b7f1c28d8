//! HTTP client for the external fetcher service.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::StatusCode;

use super::models::{AudioStream, SearchResult};
use super::{CatalogSearch, FetchError, MediaFetcher};

/// HTTP client for communicating with the fetcher service.
pub struct FetcherClient {
    client: reqwest::Client,
    base_url: String,
}

impl FetcherClient {
    /// Create a new fetcher client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the fetcher service (e.g., "http://localhost:8080")
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(base_url: String, timeout_sec: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .expect("Failed to create HTTP client");

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        Self { client, base_url }
    }

    /// Check if the fetcher service is healthy.
    pub async fn health_check(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to connect to fetcher service")?;

        if response.status().is_success() {
            Ok(())
        } else {
            anyhow::bail!(
                "Fetcher health check failed with status: {}",
                response.status()
            )
        }
    }
}

#[async_trait]
impl MediaFetcher for FetcherClient {
    async fn fetch_audio(&self, video_id: &str) -> Result<AudioStream, FetchError> {
        let url = format!("{}/audio/{}", self.base_url, video_id);
        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(FetchError::NotFound(video_id.to_string())),
            status if !status.is_success() => {
                return Err(FetchError::Unavailable(format!(
                    "fetcher answered status {} for video {}",
                    status, video_id
                )));
            }
            _ => {}
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("audio/mpeg")
            .to_string();

        // The fetcher names the file after the track title when it knows
        // it; fall back to the video id otherwise.
        let file_name = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_attachment_file_name)
            .unwrap_or_else(|| format!("{}.mp3", video_id));

        let bytes = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(FetchError::from))
            .boxed();

        Ok(AudioStream {
            file_name,
            content_type,
            bytes,
        })
    }
}

#[async_trait]
impl CatalogSearch for FetcherClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, FetchError> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("limit", &limit.to_string())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Unavailable(format!(
                "search for {:?} failed with status {}",
                query,
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}

fn parse_attachment_file_name(header: &str) -> Option<String> {
    let marker = "filename=";
    let start = header.find(marker)? + marker.len();
    let value = header[start..].trim().trim_matches('"');
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
