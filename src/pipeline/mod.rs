//! Aggregation pipeline.
//!
//! For every roster entry: resolve the identity, fetch the ranked entries,
//! select the solo-queue entry. Players are processed concurrently and the
//! results are collected back by roster index, so the snapshot order never
//! depends on which lookup finished first. A failed player only loses its
//! own ranked stats.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::fetch::LadderApi;
use crate::models::{PlayerRef, PlayerStats, RankedEntry, Snapshot};
use crate::ranked::{fetch_solo_queue, FetchError};
use crate::resolve::{resolve_identity, ResolutionError};
use crate::storage::StorageError;

/// Why one player's lookups failed.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Whole-cycle failure. The previously stored snapshot stays current.
#[derive(Debug, Error)]
pub enum CycleFailure {
    #[error("Aggregation task for {player} failed: {source}")]
    Join {
        player: PlayerRef,
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("Failed to save snapshot: {0}")]
    Storage(#[from] StorageError),

    #[error("Refresh scheduler is shut down")]
    SchedulerClosed,
}

/// Result of the lookup chain for one player.
#[derive(Debug)]
pub enum PlayerOutcome {
    Ranked(RankedEntry),
    Unranked,
    Failed(PlayerError),
}

impl PlayerOutcome {
    /// Collapse to the snapshot representation.
    pub fn into_ranked_stats(self) -> Option<RankedEntry> {
        match self {
            PlayerOutcome::Ranked(entry) => Some(entry),
            PlayerOutcome::Unranked | PlayerOutcome::Failed(_) => None,
        }
    }
}

/// Summary of one aggregation cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub started_at: Option<DateTime<Utc>>,
    pub duration_ms: u64,
    pub players: usize,
    pub ranked: usize,
    pub unranked: usize,
    pub failed: usize,
    /// One message per failed player
    pub failures: Vec<String>,
}

/// Run the lookup chain for one player. Never fails; errors become `Failed`.
pub async fn player_outcome(api: &dyn LadderApi, player: &PlayerRef) -> PlayerOutcome {
    let summoner = match resolve_identity(api, player).await {
        Ok(summoner) => summoner,
        Err(e) => return PlayerOutcome::Failed(e.into()),
    };

    match fetch_solo_queue(api, &summoner.id).await {
        Ok(Some(entry)) => PlayerOutcome::Ranked(entry),
        Ok(None) => PlayerOutcome::Unranked,
        Err(e) => PlayerOutcome::Failed(e.into()),
    }
}

/// Aggregates the configured roster into snapshots.
#[derive(Clone)]
pub struct Aggregator {
    api: Arc<dyn LadderApi>,
    roster: Arc<[PlayerRef]>,
}

impl Aggregator {
    pub fn new(api: Arc<dyn LadderApi>, roster: impl Into<Arc<[PlayerRef]>>) -> Self {
        Self {
            api,
            roster: roster.into(),
        }
    }

    /// Build one snapshot with exactly one entry per roster player, in roster order.
    pub async fn aggregate(&self) -> Result<Snapshot, CycleFailure> {
        self.aggregate_with_report()
            .await
            .map(|(snapshot, _)| snapshot)
    }

    /// Like [`Aggregator::aggregate`], also returning per-cycle counts.
    pub async fn aggregate_with_report(&self) -> Result<(Snapshot, CycleReport), CycleFailure> {
        let started_at = Utc::now();
        let timer = Instant::now();

        info!("Aggregating {} players", self.roster.len());

        let handles: Vec<_> = self
            .roster
            .iter()
            .cloned()
            .map(|player| {
                let api = self.api.clone();
                tokio::spawn(async move { player_outcome(api.as_ref(), &player).await })
            })
            .collect();

        let outcomes = join_all(handles).await;

        let mut report = CycleReport {
            started_at: Some(started_at),
            players: self.roster.len(),
            ..CycleReport::default()
        };
        let mut players = Vec::with_capacity(self.roster.len());

        for (player, outcome) in self.roster.iter().zip(outcomes) {
            let outcome = outcome.map_err(|source| CycleFailure::Join {
                player: player.clone(),
                source,
            })?;

            match &outcome {
                PlayerOutcome::Ranked(_) => report.ranked += 1,
                PlayerOutcome::Unranked => report.unranked += 1,
                PlayerOutcome::Failed(e) => {
                    warn!("{}", e);
                    report.failed += 1;
                    report.failures.push(e.to_string());
                }
            }

            players.push(PlayerStats {
                summoner_name: player.name.clone(),
                ranked_stats: outcome.into_ranked_stats(),
            });
        }

        report.duration_ms = timer.elapsed().as_millis() as u64;
        info!(
            "Aggregated {} players ({} ranked, {} unranked, {} failed) in {}ms",
            report.players, report.ranked, report.unranked, report.failed, report.duration_ms
        );

        Ok((Snapshot::new(players), report))
    }
}
