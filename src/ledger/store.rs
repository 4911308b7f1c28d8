//! The in-memory ledger store.
//!
//! Sole owner of all mutable gamification state. Every public operation
//! runs to completion under `&mut self` (or `&self` for reads), so a
//! server wrapping the store in `Arc<Mutex<_>>` gets the required
//! atomicity for the composite append → stats → badges path for free.
//! State lives in process memory only and is lost on restart.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::badges::{badge_catalog, Badge};
use super::error::LedgerError;
use super::models::{
    DownloadEntry, Favorite, NewDownload, NewFavorite, NewPlaylist, Playlist, PlaylistUpdate,
    UserStats,
};
use super::progression::{level_for_points, next_streak};

pub struct LedgerStore {
    history: HashMap<Uuid, DownloadEntry>,
    favorites: HashMap<Uuid, Favorite>,
    playlists: HashMap<Uuid, Playlist>,
    /// Seeded once at construction; insertion order is the catalog's
    /// display order and is what listing endpoints return.
    badges: Vec<Badge>,
    stats: UserStats,
}

impl LedgerStore {
    pub fn new() -> Self {
        LedgerStore {
            history: HashMap::new(),
            favorites: HashMap::new(),
            playlists: HashMap::new(),
            badges: badge_catalog(),
            stats: UserStats::default(),
        }
    }

    // ----- download history -----

    /// Record a download: insert the entry, update the stats singleton
    /// (points, level, streak) and evaluate badge unlocks, all as one
    /// operation. Returns the created entry.
    pub fn add_download(&mut self, input: NewDownload) -> DownloadEntry {
        self.add_download_at(input, Utc::now())
    }

    /// Timestamp-taking variant of [`add_download`](Self::add_download),
    /// used by tests that exercise the calendar-day streak rules.
    pub fn add_download_at(&mut self, input: NewDownload, now: DateTime<Utc>) -> DownloadEntry {
        let atomic_points = input.quality.atomic_points();
        let entry = DownloadEntry {
            id: Uuid::new_v4(),
            video_id: input.video_id,
            title: input.title,
            artist: input.artist,
            thumbnail: input.thumbnail,
            duration: input.duration,
            quality: input.quality,
            atomic_points,
            downloaded_at: now,
        };
        self.history.insert(entry.id, entry.clone());

        self.stats.streak = next_streak(self.stats.last_download_date, self.stats.streak, now);
        self.stats.total_downloads += 1;
        self.stats.total_atomic_points += atomic_points;
        self.stats.level = level_for_points(self.stats.total_atomic_points);
        self.stats.last_download_date = Some(now);

        self.evaluate_badges(now);

        entry
    }

    /// All history entries, most recent first.
    pub fn download_history(&self) -> Vec<DownloadEntry> {
        let mut entries: Vec<_> = self.history.values().cloned().collect();
        // Id as tiebreak so entries recorded within the same instant list
        // in a stable order.
        entries.sort_by(|a, b| {
            b.downloaded_at
                .cmp(&a.downloaded_at)
                .then(b.id.cmp(&a.id))
        });
        entries
    }

    /// Remove a history entry. No-op when the id is absent.
    pub fn delete_download(&mut self, id: Uuid) {
        self.history.remove(&id);
    }

    // ----- favorites -----

    /// All favorites, most recent first.
    pub fn favorites(&self) -> Vec<Favorite> {
        let mut favorites: Vec<_> = self.favorites.values().cloned().collect();
        favorites.sort_by(|a, b| b.added_at.cmp(&a.added_at).then(b.id.cmp(&a.id)));
        favorites
    }

    /// Add a favorite. Fails with [`LedgerError::Conflict`] when a favorite
    /// for the same video id already exists; the store is left untouched.
    pub fn add_favorite(&mut self, input: NewFavorite) -> Result<Favorite, LedgerError> {
        self.add_favorite_at(input, Utc::now())
    }

    pub fn add_favorite_at(
        &mut self,
        input: NewFavorite,
        now: DateTime<Utc>,
    ) -> Result<Favorite, LedgerError> {
        if self.is_favorite(&input.video_id) {
            return Err(LedgerError::Conflict {
                video_id: input.video_id,
            });
        }
        let favorite = Favorite {
            id: Uuid::new_v4(),
            video_id: input.video_id,
            title: input.title,
            artist: input.artist,
            thumbnail: input.thumbnail,
            duration: input.duration,
            playlist_id: input.playlist_id,
            added_at: now,
        };
        self.favorites.insert(favorite.id, favorite.clone());
        Ok(favorite)
    }

    /// Remove a favorite by its id. No-op when absent.
    pub fn remove_favorite(&mut self, id: Uuid) {
        self.favorites.remove(&id);
    }

    /// Remove the favorite for a video id, if any.
    pub fn remove_favorite_by_video(&mut self, video_id: &str) {
        self.favorites.retain(|_, f| f.video_id != video_id);
    }

    pub fn is_favorite(&self, video_id: &str) -> bool {
        self.favorites.values().any(|f| f.video_id == video_id)
    }

    // ----- playlists -----

    pub fn playlists(&self) -> Vec<Playlist> {
        let mut playlists: Vec<_> = self.playlists.values().cloned().collect();
        playlists.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        playlists
    }

    pub fn playlist(&self, id: Uuid) -> Option<Playlist> {
        self.playlists.get(&id).cloned()
    }

    pub fn create_playlist(&mut self, input: NewPlaylist) -> Playlist {
        let playlist = Playlist {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            created_at: Utc::now(),
            track_count: 0,
        };
        self.playlists.insert(playlist.id, playlist.clone());
        playlist
    }

    /// Apply a partial update. Returns the updated playlist, or `None`
    /// (not an error) when the id is absent.
    pub fn update_playlist(&mut self, id: Uuid, update: PlaylistUpdate) -> Option<Playlist> {
        let playlist = self.playlists.get_mut(&id)?;
        if let Some(name) = update.name {
            playlist.name = name;
        }
        if let Some(description) = update.description {
            playlist.description = Some(description);
        }
        Some(playlist.clone())
    }

    /// Remove a playlist. No-op when absent; favorites pointing at it keep
    /// their (now dangling) weak reference.
    pub fn delete_playlist(&mut self, id: Uuid) {
        self.playlists.remove(&id);
    }

    // ----- stats & badges -----

    /// Snapshot of the stats singleton.
    pub fn stats(&self) -> UserStats {
        self.stats.clone()
    }

    /// The full badge catalog, unlock state included, in catalog order.
    pub fn all_badges(&self) -> Vec<Badge> {
        self.badges.clone()
    }

    pub fn unlocked_badges(&self) -> Vec<Badge> {
        self.badges
            .iter()
            .filter(|b| b.unlocked_at.is_some())
            .cloned()
            .collect()
    }

    /// Unlock a badge by id, the out-of-band path for special badges.
    ///
    /// Idempotent: unlocking an already-unlocked badge returns it
    /// unchanged. Returns `None` for an unknown id.
    pub fn unlock_badge(&mut self, badge_id: &str) -> Option<Badge> {
        self.unlock_badge_at(badge_id, Utc::now())
    }

    pub fn unlock_badge_at(&mut self, badge_id: &str, now: DateTime<Utc>) -> Option<Badge> {
        let badge = self.badges.iter_mut().find(|b| b.id == badge_id)?;
        if badge.unlocked_at.is_none() {
            badge.unlocked_at = Some(now);
        }
        let badge = badge.clone();
        if !self.stats.badges.iter().any(|id| id == badge_id) {
            self.stats.badges.push(badge.id.clone());
        }
        Some(badge)
    }

    /// Unlock every still-locked badge whose threshold the current state
    /// satisfies. Runs after each stats update; unlocks are one-way, so
    /// re-evaluation never changes an already-unlocked badge.
    fn evaluate_badges(&mut self, now: DateTime<Utc>) {
        let favorites_count = self.favorites.len();
        for badge in self.badges.iter_mut() {
            if badge.unlocked_at.is_some() {
                continue;
            }
            if badge.requirement_met(&self.stats, favorites_count) {
                badge.unlocked_at = Some(now);
                if !self.stats.badges.iter().any(|id| id == &badge.id) {
                    self.stats.badges.push(badge.id.clone());
                }
            }
        }
    }
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::models::AudioQuality;
    use chrono::{Duration, NaiveDateTime};

    fn at(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    fn download(video_id: &str, quality: AudioQuality) -> NewDownload {
        NewDownload {
            video_id: video_id.to_string(),
            title: format!("Track {}", video_id),
            artist: "Test Artist".to_string(),
            thumbnail: "http://example.com/thumb.jpg".to_string(),
            duration: "3:42".to_string(),
            quality,
        }
    }

    fn favorite(video_id: &str) -> NewFavorite {
        NewFavorite {
            video_id: video_id.to_string(),
            title: format!("Track {}", video_id),
            artist: "Test Artist".to_string(),
            thumbnail: "http://example.com/thumb.jpg".to_string(),
            duration: "3:42".to_string(),
            playlist_id: None,
        }
    }

    #[test]
    fn add_download_awards_quality_points() {
        let mut store = LedgerStore::new();
        let entry = store.add_download(download("a", AudioQuality::Kbps128));
        assert_eq!(entry.atomic_points, 1);
        store.add_download(download("b", AudioQuality::Kbps192));
        store.add_download(download("c", AudioQuality::Kbps320));

        let stats = store.stats();
        assert_eq!(stats.total_downloads, 3);
        assert_eq!(stats.total_atomic_points, 6);
    }

    #[test]
    fn level_tracks_cumulative_points() {
        let mut store = LedgerStore::new();
        assert_eq!(store.stats().level, 1);
        store.add_download(download("a", AudioQuality::Kbps128));
        assert_eq!(store.stats().level, 2); // 1 point
        store.add_download(download("b", AudioQuality::Kbps320));
        assert_eq!(store.stats().level, 3); // 4 points
    }

    #[test]
    fn three_320_downloads_reach_level_four() {
        let mut store = LedgerStore::new();
        for id in ["a", "b", "c"] {
            store.add_download(download(id, AudioQuality::Kbps320));
        }
        let stats = store.stats();
        assert_eq!(stats.total_downloads, 3);
        assert_eq!(stats.total_atomic_points, 9);
        assert_eq!(stats.level, 4);
        assert!(stats.badges.contains(&"first-download".to_string()));
    }

    #[test]
    fn first_download_unlocks_first_badge_immediately() {
        let mut store = LedgerStore::new();
        store.add_download(download("a", AudioQuality::Kbps128));
        let unlocked = store.unlocked_badges();
        assert_eq!(unlocked.len(), 1);
        assert_eq!(unlocked[0].id, "first-download");
        assert!(unlocked[0].unlocked_at.is_some());
    }

    #[test]
    fn history_is_most_recent_first() {
        let mut store = LedgerStore::new();
        let t0 = at("2024-03-10 10:00:00");
        store.add_download_at(download("a", AudioQuality::Kbps128), t0);
        store.add_download_at(download("b", AudioQuality::Kbps128), t0 + Duration::minutes(5));
        store.add_download_at(download("c", AudioQuality::Kbps128), t0 + Duration::minutes(2));

        let history = store.download_history();
        let ids: Vec<_> = history.iter().map(|e| e.video_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn delete_download_is_idempotent() {
        let mut store = LedgerStore::new();
        let entry = store.add_download(download("a", AudioQuality::Kbps128));
        store.delete_download(entry.id);
        assert!(store.download_history().is_empty());
        // absent id, still a no-op
        store.delete_download(entry.id);
        store.delete_download(Uuid::new_v4());
        assert!(store.download_history().is_empty());
        // stats are untouched by history deletion
        assert_eq!(store.stats().total_downloads, 1);
    }

    #[test]
    fn streak_follows_calendar_days() {
        let mut store = LedgerStore::new();
        let day1 = at("2024-03-10 12:00:00");
        store.add_download_at(download("a", AudioQuality::Kbps128), day1);
        assert_eq!(store.stats().streak, 1);

        // same day, unchanged
        store.add_download_at(download("b", AudioQuality::Kbps128), day1 + Duration::hours(3));
        assert_eq!(store.stats().streak, 1);

        // next calendar day, incremented
        store.add_download_at(download("c", AudioQuality::Kbps128), at("2024-03-11 09:00:00"));
        assert_eq!(store.stats().streak, 2);

        // three-day gap, reset
        store.add_download_at(download("d", AudioQuality::Kbps128), at("2024-03-14 09:00:00"));
        assert_eq!(store.stats().streak, 1);
    }

    #[test]
    fn streak_survives_midnight_crossing() {
        let mut store = LedgerStore::new();
        store.add_download_at(download("a", AudioQuality::Kbps128), at("2024-03-10 23:59:00"));
        store.add_download_at(download("b", AudioQuality::Kbps128), at("2024-03-11 00:01:00"));
        assert_eq!(store.stats().streak, 2);
    }

    #[test]
    fn streak_badge_unlocks_at_threshold() {
        let mut store = LedgerStore::new();
        for day in 10..=12 {
            store.add_download_at(
                download(&format!("v{}", day), AudioQuality::Kbps128),
                at(&format!("2024-03-{} 12:00:00", day)),
            );
        }
        assert_eq!(store.stats().streak, 3);
        assert!(store.stats().badges.contains(&"streak-3".to_string()));
        assert!(!store.stats().badges.contains(&"streak-7".to_string()));
    }

    #[test]
    fn duplicate_favorite_is_a_conflict() {
        let mut store = LedgerStore::new();
        store.add_favorite(favorite("a")).unwrap();
        let err = store.add_favorite(favorite("a")).unwrap_err();
        assert_eq!(
            err,
            LedgerError::Conflict {
                video_id: "a".to_string()
            }
        );
        assert_eq!(store.favorites().len(), 1);
    }

    #[test]
    fn favorite_removal_is_idempotent() {
        let mut store = LedgerStore::new();
        let fav = store.add_favorite(favorite("a")).unwrap();
        store.remove_favorite(fav.id);
        assert!(!store.is_favorite("a"));
        store.remove_favorite(fav.id);
        store.remove_favorite(Uuid::new_v4());
        assert!(store.favorites().is_empty());
    }

    #[test]
    fn remove_favorite_by_video_frees_the_slot() {
        let mut store = LedgerStore::new();
        store.add_favorite(favorite("a")).unwrap();
        store.remove_favorite_by_video("a");
        assert!(!store.is_favorite("a"));
        // the video can be favorited again afterwards
        store.add_favorite(favorite("a")).unwrap();
        assert!(store.is_favorite("a"));
    }

    #[test]
    fn collector_badge_unlocks_on_twentieth_favorite_not_before() {
        let mut store = LedgerStore::new();
        for i in 0..19 {
            store.add_favorite(favorite(&format!("v{}", i))).unwrap();
        }
        // badge evaluation runs on the download path
        store.add_download(download("d1", AudioQuality::Kbps128));
        assert!(!store.stats().badges.contains(&"collector".to_string()));

        store.add_favorite(favorite("v19")).unwrap();
        store.add_download(download("d2", AudioQuality::Kbps128));
        assert!(store.stats().badges.contains(&"collector".to_string()));
    }

    #[test]
    fn unlock_is_monotonic_and_set_like() {
        let mut store = LedgerStore::new();
        store.add_download(download("a", AudioQuality::Kbps128));
        let first = store
            .all_badges()
            .into_iter()
            .find(|b| b.id == "first-download")
            .unwrap();
        let unlocked_at = first.unlocked_at.unwrap();

        // further downloads re-trigger evaluation but never move the timestamp
        store.add_download(download("b", AudioQuality::Kbps128));
        store.add_download(download("c", AudioQuality::Kbps128));
        let again = store
            .all_badges()
            .into_iter()
            .find(|b| b.id == "first-download")
            .unwrap();
        assert_eq!(again.unlocked_at, Some(unlocked_at));

        let occurrences = store
            .stats()
            .badges
            .iter()
            .filter(|id| id.as_str() == "first-download")
            .count();
        assert_eq!(occurrences, 1);
    }

    #[test]
    fn explicit_unlock_is_idempotent() {
        let mut store = LedgerStore::new();
        let badge = store.unlock_badge("i-am-atomic").unwrap();
        let unlocked_at = badge.unlocked_at.unwrap();

        let badge = store.unlock_badge("i-am-atomic").unwrap();
        assert_eq!(badge.unlocked_at, Some(unlocked_at));
        assert_eq!(
            store
                .stats()
                .badges
                .iter()
                .filter(|id| id.as_str() == "i-am-atomic")
                .count(),
            1
        );

        assert!(store.unlock_badge("no-such-badge").is_none());
    }

    #[test]
    fn badge_listing_keeps_catalog_order() {
        let mut store = LedgerStore::new();
        store.add_download(download("a", AudioQuality::Kbps320));
        let ids: Vec<_> = store.all_badges().into_iter().map(|b| b.id).collect();
        assert_eq!(ids[0], "first-download");
        assert_eq!(ids[9], "i-am-atomic");
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn playlist_crud_round_trip() {
        let mut store = LedgerStore::new();
        let playlist = store.create_playlist(NewPlaylist {
            name: "OSTs".to_string(),
            description: None,
        });
        assert_eq!(playlist.track_count, 0);

        let updated = store
            .update_playlist(
                playlist.id,
                PlaylistUpdate {
                    name: Some("Anime OSTs".to_string()),
                    description: Some("openings".to_string()),
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Anime OSTs");
        assert_eq!(updated.description.as_deref(), Some("openings"));

        assert!(store
            .update_playlist(Uuid::new_v4(), PlaylistUpdate::default())
            .is_none());

        store.delete_playlist(playlist.id);
        assert!(store.playlist(playlist.id).is_none());
        // absent id, no-op
        store.delete_playlist(playlist.id);
        assert!(store.playlists().is_empty());
    }
}
