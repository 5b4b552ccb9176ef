use std::cmp::Reverse;

use crate::xiuxian::realm;
use crate::xiuxian::types::PlayerRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingKind {
    /// Banked experience.
    Exp,
    /// Realm position, then experience.
    Realm,
    /// Gold held.
    Wealth,
}

impl RankingKind {
    /// Accepts the Chinese board names as well as English ones.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "修为" | "exp" | "experience" => Some(RankingKind::Exp),
            "" | "境界" | "realm" | "level" => Some(RankingKind::Realm),
            "财富" | "灵石" | "wealth" | "gold" => Some(RankingKind::Wealth),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            RankingKind::Exp => "修为",
            RankingKind::Realm => "境界",
            RankingKind::Wealth => "财富",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingEntry {
    pub rank: usize,
    pub player_id: String,
    pub display_name: String,
    pub realm_name: String,
    pub exp: u64,
    pub gold: u64,
}

/// Sort `players` for the requested board and keep the top `limit`.
///
/// Ties fall back to the player id so the order is stable across calls.
pub fn rank(mut players: Vec<PlayerRecord>, kind: RankingKind, limit: usize) -> Vec<RankingEntry> {
    match kind {
        RankingKind::Exp => players.sort_by_key(|p| (Reverse(p.exp), p.id.clone())),
        RankingKind::Realm => players.sort_by_key(|p| {
            (
                Reverse((p.major_level, p.minor_level, p.exp)),
                p.id.clone(),
            )
        }),
        RankingKind::Wealth => players.sort_by_key(|p| (Reverse(p.gold), p.id.clone())),
    }
    players
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, p)| RankingEntry {
            rank: i + 1,
            realm_name: realm::realm_info(p.major_level, p.minor_level).full_name,
            player_id: p.id,
            display_name: p.display_name,
            exp: p.exp,
            gold: p.gold,
        })
        .collect()
}
