//! Roster and snapshot models.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::RankedEntry;

/// A tracked player, identified by Riot ID (`name#tag`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerRef {
    pub name: String,
    pub tag: String,
}

impl PlayerRef {
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
        }
    }
}

impl fmt::Display for PlayerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.tag)
    }
}

/// Aggregated standing of one roster player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    /// Configured roster name
    pub summoner_name: String,

    /// Solo-queue entry; `None` when unranked or when the lookup failed
    pub ranked_stats: Option<RankedEntry>,
}

impl PlayerStats {
    pub fn ranked(summoner_name: impl Into<String>, entry: RankedEntry) -> Self {
        Self {
            summoner_name: summoner_name.into(),
            ranked_stats: Some(entry),
        }
    }

    pub fn unranked(summoner_name: impl Into<String>) -> Self {
        Self {
            summoner_name: summoner_name.into(),
            ranked_stats: None,
        }
    }
}

/// One complete aggregation result, in roster order.
///
/// Serialized as a bare JSON array of [`PlayerStats`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    pub players: Vec<PlayerStats>,
}

impl Snapshot {
    pub fn new(players: Vec<PlayerStats>) -> Self {
        Self { players }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlayerStats> {
        self.players.iter()
    }
}
