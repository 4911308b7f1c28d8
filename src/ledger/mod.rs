//! The gamified download ledger: entity models, the in-memory store, and
//! the derived stats/streak/badge computation.

pub mod badges;
pub mod error;
pub mod models;
pub mod progression;
pub mod store;

pub use badges::{Badge, BadgeCategory, BadgeRarity};
pub use error::LedgerError;
pub use models::{
    AudioQuality, DownloadEntry, Favorite, NewDownload, NewFavorite, NewPlaylist, Playlist,
    PlaylistUpdate, UserStats,
};
pub use store::LedgerStore;
