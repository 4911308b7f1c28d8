//! Badge catalog and unlock rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::UserStats;

/// What a badge's requirement threshold is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeCategory {
    Downloads,
    Streak,
    Collection,
    /// Never auto-evaluated; unlocked only through the explicit unlock path.
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeRarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

/// An achievement with a fixed unlock threshold.
///
/// The catalog is seeded once at store creation; only `unlocked_at`
/// mutates over a badge's lifetime, and the transition is one-way.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub requirement: u32,
    pub category: BadgeCategory,
    pub rarity: BadgeRarity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Badge {
    /// Whether the current state satisfies this badge's threshold.
    ///
    /// Special badges always report false here; they are gated by the
    /// explicit unlock call instead.
    pub fn requirement_met(&self, stats: &UserStats, favorites_count: usize) -> bool {
        match self.category {
            BadgeCategory::Downloads => stats.total_downloads >= u64::from(self.requirement),
            BadgeCategory::Streak => stats.streak >= self.requirement,
            BadgeCategory::Collection => favorites_count >= self.requirement as usize,
            BadgeCategory::Special => false,
        }
    }
}

fn badge(
    id: &str,
    name: &str,
    description: &str,
    icon: &str,
    requirement: u32,
    category: BadgeCategory,
    rarity: BadgeRarity,
) -> Badge {
    Badge {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        requirement,
        category,
        rarity,
        unlocked_at: None,
    }
}

/// The fixed badge catalog, in display order.
pub fn badge_catalog() -> Vec<Badge> {
    use BadgeCategory::*;
    use BadgeRarity::*;
    vec![
        badge("first-download", "Premier Pas Atomique", "Premier téléchargement", "Zap", 1, Downloads, Common),
        badge("anime-fan", "Fan d'Anime", "Téléchargé 10 OST d'anime", "Music", 10, Downloads, Common),
        badge("power-user", "Utilisateur Atomique", "50 téléchargements", "Star", 50, Downloads, Rare),
        badge("atomic-master", "Maître Atomique", "100 téléchargements", "Crown", 100, Downloads, Epic),
        badge("eminence-shadow", "Eminence in Shadow", "500 téléchargements", "Sparkles", 500, Downloads, Legendary),
        badge("streak-3", "Série de 3", "3 jours consécutifs", "Flame", 3, Streak, Common),
        badge("streak-7", "Série de 7", "7 jours consécutifs", "Flame", 7, Streak, Rare),
        badge("streak-30", "Série Atomique", "30 jours consécutifs", "Flame", 30, Streak, Epic),
        badge("collector", "Collectionneur", "20 favoris", "Heart", 20, Collection, Rare),
        badge("i-am-atomic", "I AM ATOMIC", "Badge spécial des fondateurs", "Zap", 1, Special, Legendary),
    ]
}
