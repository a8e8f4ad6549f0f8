//! Provider payloads for the account, summoner and league lookups.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Puuid, SummonerId};

/// Queue type tag of the solo ranked ladder.
pub const SOLO_QUEUE: &str = "RANKED_SOLO_5x5";

/// Account-level record (`/riot/account/v1/accounts/by-riot-id`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub puuid: Puuid,
    #[serde(default)]
    pub game_name: Option<String>,
    #[serde(default)]
    pub tag_line: Option<String>,
}

/// Platform-level summoner record (`/lol/summoner/v4/summoners/by-puuid`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummonerRecord {
    /// Summoner id used by the league lookup
    pub id: SummonerId,
    pub puuid: Puuid,
    #[serde(default)]
    pub summoner_level: Option<u64>,
    #[serde(default)]
    pub profile_icon_id: Option<u32>,
}

/// One queue's standing (`/lol/league/v4/entries/by-summoner`).
///
/// Only the fields below are interpreted. Anything else the provider sends
/// is kept in `extra` so the stored snapshot carries the entry as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub queue_type: String,
    pub tier: String,
    pub rank: String,
    pub league_points: i32,
    pub wins: u32,
    pub losses: u32,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RankedEntry {
    pub fn new(
        queue_type: impl Into<String>,
        tier: impl Into<String>,
        rank: impl Into<String>,
        league_points: i32,
        wins: u32,
        losses: u32,
    ) -> Self {
        Self {
            queue_type: queue_type.into(),
            tier: tier.into(),
            rank: rank.into(),
            league_points,
            wins,
            losses,
            extra: Map::new(),
        }
    }

    /// Whether this is the solo ranked ladder entry.
    pub fn is_solo_queue(&self) -> bool {
        self.queue_type == SOLO_QUEUE
    }

    /// Total games played.
    pub fn total_games(&self) -> u64 {
        u64::from(self.wins) + u64::from(self.losses)
    }

    /// Win rate as a fraction (0.0 to 1.0). A player with no games has 0.0.
    pub fn win_rate(&self) -> f64 {
        let total = self.total_games();
        if total == 0 {
            0.0
        } else {
            self.wins as f64 / total as f64
        }
    }
}
