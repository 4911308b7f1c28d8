//! Level and streak derivation.
//!
//! Both functions are pure: the store invokes them as part of its
//! download-append path and they never fail.

use chrono::{DateTime, Utc};

/// Level for a cumulative point total: `floor(1 + sqrt(points))`.
///
/// Recomputed from the running total on every download, so it can only
/// grow. The floor/sqrt shape makes early levels cheap and later ones
/// progressively more expensive.
pub fn level_for_points(points: u64) -> u32 {
    (1.0 + (points as f64).sqrt()).floor() as u32
}

/// Streak value after a download at `now`, given the previous download
/// timestamp and the current streak.
///
/// The comparison is calendar-date based (UTC), not elapsed-time based:
/// a download at 23:59 followed by one at 00:01 the next day extends the
/// streak, while two downloads on the same date leave it unchanged. Any
/// gap of two or more calendar days, or a first-ever download, resets to 1.
pub fn next_streak(last_download: Option<DateTime<Utc>>, streak: u32, now: DateTime<Utc>) -> u32 {
    let today = now.date_naive();
    match last_download.map(|t| t.date_naive()) {
        Some(last) if last == today => streak,
        Some(last) if last.succ_opt() == Some(today) => streak + 1,
        _ => 1,
    }
}
