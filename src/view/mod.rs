//! Derived view over a snapshot.
//!
//! Filters players by name and sorts them by one column, the way the stats
//! table presents them:
//! - Name filter is a case-insensitive substring match.
//! - Sorting is stable. Ties keep snapshot order.
//! - A player without ranked stats has no value for any ranked column. Under
//!   those columns such players keep their position and the ranked players
//!   are sorted among the remaining positions.
//! - Win rate is `wins / (wins + losses)`, and 0 for a player with no games.

use std::cmp::Ordering;
use std::fmt::{self, Write as _};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{PlayerStats, RankedEntry, Snapshot};

/// Sortable table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    SummonerName,
    Tier,
    Rank,
    LeaguePoints,
    Wins,
    Losses,
    WinRate,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::SummonerName,
        SortKey::Tier,
        SortKey::Rank,
        SortKey::LeaguePoints,
        SortKey::Wins,
        SortKey::Losses,
        SortKey::WinRate,
    ];

    /// Column id as used by the client.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::SummonerName => "summonerName",
            SortKey::Tier => "tier",
            SortKey::Rank => "rank",
            SortKey::LeaguePoints => "leaguePoints",
            SortKey::Wins => "wins",
            SortKey::Losses => "losses",
            SortKey::WinRate => "winRate",
        }
    }

    /// Compare two ranked entries on this column.
    fn compare_ranked(&self, a: &RankedEntry, b: &RankedEntry) -> Ordering {
        match self {
            SortKey::SummonerName => Ordering::Equal,
            SortKey::Tier => a.tier.cmp(&b.tier),
            SortKey::Rank => a.rank.cmp(&b.rank),
            SortKey::LeaguePoints => a.league_points.cmp(&b.league_points),
            SortKey::Wins => a.wins.cmp(&b.wins),
            SortKey::Losses => a.losses.cmp(&b.losses),
            SortKey::WinRate => a.win_rate().total_cmp(&b.win_rate()),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("name") {
            return Ok(SortKey::SummonerName);
        }
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown sort column: {}", s))
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(format!("Unknown sort direction: {}", s)),
        }
    }
}

/// Whether a player's name contains the filter text, ignoring case.
pub fn matches_filter(player: &PlayerStats, filter_text: &str) -> bool {
    filter_text.is_empty()
        || player
            .summoner_name
            .to_lowercase()
            .contains(&filter_text.to_lowercase())
}

/// Filter then stably sort a snapshot. The snapshot is not modified.
pub fn derive_view(
    snapshot: &Snapshot,
    filter_text: &str,
    sort_key: SortKey,
    direction: SortDirection,
) -> Vec<PlayerStats> {
    let mut rows: Vec<PlayerStats> = snapshot
        .iter()
        .filter(|p| matches_filter(p, filter_text))
        .cloned()
        .collect();

    if sort_key == SortKey::SummonerName {
        rows.sort_by(|a, b| direction.apply(a.summoner_name.cmp(&b.summoner_name)));
        return rows;
    }

    // Ranked players are sorted into the slots they already occupy; the
    // others stay where the filter left them.
    let slots: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, p)| p.ranked_stats.is_some())
        .map(|(i, _)| i)
        .collect();

    let mut ranked: Vec<PlayerStats> = slots.iter().map(|&i| rows[i].clone()).collect();
    ranked.sort_by(|a, b| match (&a.ranked_stats, &b.ranked_stats) {
        (Some(a), Some(b)) => direction.apply(sort_key.compare_ranked(a, b)),
        _ => Ordering::Equal,
    });

    for (slot, player) in slots.into_iter().zip(ranked) {
        rows[slot] = player;
    }
    rows
}

/// Display projection of one player, as shown in the stats table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRow {
    pub summoner_name: String,
    pub tier: String,
    pub rank: String,
    pub league_points: i32,
    pub wins: u32,
    pub losses: u32,
    /// Percentage with two decimals, e.g. "52.63"
    pub win_rate: String,
}

impl From<&PlayerStats> for ViewRow {
    fn from(player: &PlayerStats) -> Self {
        match &player.ranked_stats {
            Some(entry) => Self {
                summoner_name: player.summoner_name.clone(),
                tier: entry.tier.clone(),
                rank: entry.rank.clone(),
                league_points: entry.league_points,
                wins: entry.wins,
                losses: entry.losses,
                win_rate: format!("{:.2}", entry.win_rate() * 100.0),
            },
            None => Self {
                summoner_name: player.summoner_name.clone(),
                tier: "Unranked".to_string(),
                rank: "-".to_string(),
                league_points: 0,
                wins: 0,
                losses: 0,
                win_rate: "0.00".to_string(),
            },
        }
    }
}

const HEADERS: [&str; 7] = ["Summoner Name", "Tier", "Rank", "LP", "Wins", "Losses", "Win Rate"];

/// Render rows as a fixed-width text table.
pub fn render_table(rows: &[ViewRow]) -> String {
    let cells: Vec<[String; 7]> = rows
        .iter()
        .map(|r| {
            [
                r.summoner_name.clone(),
                r.tier.clone(),
                r.rank.clone(),
                r.league_points.to_string(),
                r.wins.to_string(),
                r.losses.to_string(),
                r.win_rate.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut write_line = |values: &[String]| {
        let line = values
            .iter()
            .zip(widths)
            .map(|(v, w)| format!("{:<width$}", v, width = w))
            .collect::<Vec<_>>()
            .join("  ");
        let _ = writeln!(out, "{}", line.trim_end());
    };

    write_line(&HEADERS.map(String::from));
    write_line(&widths.map(|w| "-".repeat(w)));
    for row in &cells {
        write_line(row);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SOLO_QUEUE;
    use pretty_assertions::assert_eq;

    fn ranked(name: &str, tier: &str, rank: &str, lp: i32, wins: u32, losses: u32) -> PlayerStats {
        PlayerStats::ranked(name, RankedEntry::new(SOLO_QUEUE, tier, rank, lp, wins, losses))
    }

    fn names(rows: &[PlayerStats]) -> Vec<&str> {
        rows.iter().map(|p| p.summoner_name.as_str()).collect()
    }

    fn sample() -> Snapshot {
        Snapshot::new(vec![
            ranked("Pause", "GOLD", "II", 57, 30, 25),
            ranked("Dritzh", "SILVER", "I", 12, 10, 0),
            ranked("Sleeper", "PLATINUM", "IV", 88, 5, 5),
            PlayerStats::unranked("Gërsön"),
        ])
    }

    #[test]
    fn test_sort_by_name_asc() {
        let rows = derive_view(&sample(), "", SortKey::SummonerName, SortDirection::Asc);
        assert_eq!(names(&rows), vec!["Dritzh", "Gërsön", "Pause", "Sleeper"]);
    }

    #[test]
    fn test_sort_by_name_desc() {
        let rows = derive_view(&sample(), "", SortKey::SummonerName, SortDirection::Desc);
        assert_eq!(names(&rows), vec!["Sleeper", "Pause", "Gërsön", "Dritzh"]);
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let snapshot = Snapshot::new(vec![PlayerStats::unranked("Pause"), PlayerStats::unranked("Sleeper")]);
        let rows = derive_view(&snapshot, "se", SortKey::SummonerName, SortDirection::Asc);
        assert_eq!(names(&rows), vec!["Sleeper"]);

        let rows = derive_view(&snapshot, "PAU", SortKey::SummonerName, SortDirection::Asc);
        assert_eq!(names(&rows), vec!["Pause"]);
    }

    #[test]
    fn test_filter_non_ascii() {
        let rows = derive_view(&sample(), "GËR", SortKey::SummonerName, SortDirection::Asc);
        assert_eq!(names(&rows), vec!["Gërsön"]);
    }

    #[test]
    fn test_empty_filter_keeps_all() {
        let rows = derive_view(&sample(), "", SortKey::Wins, SortDirection::Asc);
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn test_filter_without_match() {
        assert!(derive_view(&sample(), "zzz", SortKey::Tier, SortDirection::Asc).is_empty());
    }

    #[test]
    fn test_win_rate_sort() {
        let snapshot = Snapshot::new(vec![ranked("A", "GOLD", "I", 0, 10, 0), ranked("B", "GOLD", "I", 0, 5, 5)]);

        let rows = derive_view(&snapshot, "", SortKey::WinRate, SortDirection::Asc);
        assert_eq!(names(&rows), vec!["B", "A"]);

        let rows = derive_view(&snapshot, "", SortKey::WinRate, SortDirection::Desc);
        assert_eq!(names(&rows), vec!["A", "B"]);
    }

    #[test]
    fn test_win_rate_with_no_games_sorts_as_zero() {
        let snapshot = Snapshot::new(vec![
            ranked("A", "GOLD", "I", 0, 1, 1),
            ranked("Fresh", "GOLD", "I", 0, 0, 0),
            ranked("B", "GOLD", "I", 0, 0, 3),
        ]);

        let rows = derive_view(&snapshot, "", SortKey::WinRate, SortDirection::Asc);
        // Fresh and B both have rate 0; snapshot order breaks the tie.
        assert_eq!(names(&rows), vec!["Fresh", "B", "A"]);

        let again = derive_view(&snapshot, "", SortKey::WinRate, SortDirection::Asc);
        assert_eq!(rows, again);
    }

    #[test]
    fn test_numeric_sort_is_numeric() {
        let snapshot = Snapshot::new(vec![
            ranked("A", "GOLD", "I", 100, 0, 0),
            ranked("B", "GOLD", "I", 9, 0, 0),
            ranked("C", "GOLD", "I", 20, 0, 0),
        ]);
        let rows = derive_view(&snapshot, "", SortKey::LeaguePoints, SortDirection::Asc);
        assert_eq!(names(&rows), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_string_columns_are_lexicographic() {
        let rows = derive_view(&sample(), "", SortKey::Tier, SortDirection::Asc);
        // GOLD < PLATINUM < SILVER; the unranked player keeps its slot.
        assert_eq!(names(&rows), vec!["Pause", "Sleeper", "Dritzh", "Gërsön"]);

        let rows = derive_view(&sample(), "", SortKey::Rank, SortDirection::Asc);
        assert_eq!(names(&rows), vec!["Dritzh", "Pause", "Sleeper", "Gërsön"]);
    }

    #[test]
    fn test_unranked_players_keep_their_position() {
        let snapshot = Snapshot::new(vec![
            ranked("A", "GOLD", "I", 0, 1, 0),
            PlayerStats::unranked("U1"),
            ranked("B", "GOLD", "I", 0, 9, 0),
            PlayerStats::unranked("U2"),
            ranked("C", "GOLD", "I", 0, 5, 0),
        ]);

        let rows = derive_view(&snapshot, "", SortKey::Wins, SortDirection::Desc);
        assert_eq!(names(&rows), vec!["B", "U1", "C", "U2", "A"]);

        let rows = derive_view(&snapshot, "", SortKey::Wins, SortDirection::Asc);
        assert_eq!(names(&rows), vec!["A", "U1", "C", "U2", "B"]);
    }

    #[test]
    fn test_all_unranked_is_unchanged() {
        let snapshot = Snapshot::new(vec![PlayerStats::unranked("Z"), PlayerStats::unranked("A")]);
        for key in SortKey::ALL.into_iter().filter(|k| *k != SortKey::SummonerName) {
            let rows = derive_view(&snapshot, "", key, SortDirection::Desc);
            assert_eq!(names(&rows), vec!["Z", "A"]);
        }
    }

    #[test]
    fn test_ties_keep_snapshot_order_in_both_directions() {
        let snapshot = Snapshot::new(vec![
            ranked("First", "GOLD", "I", 10, 0, 0),
            ranked("Second", "GOLD", "I", 10, 0, 0),
        ]);
        let asc = derive_view(&snapshot, "", SortKey::Tier, SortDirection::Asc);
        let desc = derive_view(&snapshot, "", SortKey::Tier, SortDirection::Desc);
        assert_eq!(names(&asc), vec!["First", "Second"]);
        assert_eq!(names(&desc), vec!["First", "Second"]);
    }

    #[test]
    fn test_snapshot_is_not_modified() {
        let snapshot = sample();
        let before = snapshot.clone();
        let _ = derive_view(&snapshot, "a", SortKey::LeaguePoints, SortDirection::Desc);
        assert_eq!(snapshot, before);
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("summonerName".parse::<SortKey>(), Ok(SortKey::SummonerName));
        assert_eq!("name".parse::<SortKey>(), Ok(SortKey::SummonerName));
        assert_eq!("winRate".parse::<SortKey>(), Ok(SortKey::WinRate));
        assert_eq!("leaguepoints".parse::<SortKey>(), Ok(SortKey::LeaguePoints));
        assert!("kda".parse::<SortKey>().is_err());

        for key in SortKey::ALL {
            assert_eq!(key.to_string().parse::<SortKey>(), Ok(key));
        }
    }

    #[test]
    fn test_sort_direction_parse() {
        assert_eq!("asc".parse::<SortDirection>(), Ok(SortDirection::Asc));
        assert_eq!("DESC".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert!("up".parse::<SortDirection>().is_err());
    }

    #[test]
    fn test_view_row_ranked() {
        let row = ViewRow::from(&ranked("Pause", "GOLD", "II", 57, 10, 9));
        assert_eq!(row.tier, "GOLD");
        assert_eq!(row.win_rate, "52.63");
    }

    #[test]
    fn test_view_row_unranked() {
        let row = ViewRow::from(&PlayerStats::unranked("Pause"));
        assert_eq!(row.tier, "Unranked");
        assert_eq!(row.rank, "-");
        assert_eq!(row.league_points, 0);
        assert_eq!(row.win_rate, "0.00");
    }

    #[test]
    fn test_win_rate_sort_at_counter_limits() {
        let snapshot = Snapshot::new(vec![
            ranked("Grinder", "GOLD", "I", 0, u32::MAX, u32::MAX),
            ranked("Pause", "GOLD", "II", 57, 10, 9),
        ]);

        let rows = derive_view(&snapshot, "", SortKey::WinRate, SortDirection::Desc);
        assert_eq!(names(&rows), vec!["Pause", "Grinder"]);
        assert_eq!(ViewRow::from(&rows[1]).win_rate, "50.00");
    }

    #[test]
    fn test_view_row_no_games() {
        let row = ViewRow::from(&ranked("Fresh", "IRON", "IV", 0, 0, 0));
        assert_eq!(row.win_rate, "0.00");
    }

    #[test]
    fn test_render_table() {
        let rows: Vec<ViewRow> = sample().iter().map(ViewRow::from).collect();
        let table = render_table(&rows);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("Summoner Name  Tier"));
        assert!(lines[1].starts_with("-------------  --------"));
        assert!(lines[2].starts_with("Pause"));
        assert!(lines[5].contains("Unranked"));
        assert!(lines[5].ends_with("0.00"));
    }
}
