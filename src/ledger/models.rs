//! Ledger data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audio quality of a downloaded track, in kbps.
///
/// Serialized as the plain strings `"128"`, `"192"` and `"320"`; any other
/// value is rejected at deserialization time, before it can reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioQuality {
    #[serde(rename = "128")]
    Kbps128,
    #[serde(rename = "192")]
    Kbps192,
    #[serde(rename = "320")]
    Kbps320,
}

impl AudioQuality {
    /// Atomic points awarded for a download at this quality.
    pub fn atomic_points(&self) -> u64 {
        match self {
            AudioQuality::Kbps128 => 1,
            AudioQuality::Kbps192 => 2,
            AudioQuality::Kbps320 => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioQuality::Kbps128 => "128",
            AudioQuality::Kbps192 => "192",
            AudioQuality::Kbps320 => "320",
        }
    }
}

/// An entry in the download history. Immutable once created, except for deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadEntry {
    pub id: Uuid,
    pub video_id: String,
    pub title: String,
    pub artist: String,
    pub thumbnail: String,
    pub duration: String,
    pub quality: AudioQuality,
    pub atomic_points: u64,
    pub downloaded_at: DateTime<Utc>,
}

/// Input shape for recording a download.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDownload {
    pub video_id: String,
    pub title: String,
    pub artist: String,
    pub thumbnail: String,
    pub duration: String,
    pub quality: AudioQuality,
}

/// A favorited track. At most one favorite may exist per video id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: Uuid,
    pub video_id: String,
    pub title: String,
    pub artist: String,
    pub thumbnail: String,
    pub duration: String,
    /// Weak reference to a playlist; not ownership.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_id: Option<Uuid>,
    pub added_at: DateTime<Utc>,
}

/// Input shape for adding a favorite.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFavorite {
    pub video_id: String,
    pub title: String,
    pub artist: String,
    pub thumbnail: String,
    pub duration: String,
    #[serde(default)]
    pub playlist_id: Option<Uuid>,
}

/// A user playlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Denormalized counter, known-stale: favorite associations do not
    /// maintain it and it stays at zero. Kept for wire compatibility.
    pub track_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlaylist {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update for a playlist. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// The process-wide gamification stats singleton.
///
/// Mutated only by the ledger store's download-append path; counters are
/// monotonically non-decreasing and there is no reset operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_downloads: u64,
    pub total_atomic_points: u64,
    pub level: u32,
    /// Unlocked badge ids. Set-like: each id appears at most once.
    pub badges: Vec<String>,
    /// Consecutive calendar days with at least one download.
    pub streak: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_download_date: Option<DateTime<Utc>>,
}

impl Default for UserStats {
    fn default() -> Self {
        UserStats {
            total_downloads: 0,
            total_atomic_points: 0,
            level: 1,
            badges: Vec::new(),
            streak: 0,
            last_download_date: None,
        }
    }
}
