//! Identity resolution.
//!
//! Turns a roster entry into the platform summoner record in two dependent
//! steps: Riot ID to puuid (account lookup), then puuid to summoner
//! (summoner lookup). The second step needs the first one's output, so the
//! two calls for a single player are always sequential.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::fetch::{ClientError, LadderApi};
use crate::models::{PlayerRef, SummonerRecord};

/// Lookup step of the identity chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStep {
    Account,
    Summoner,
}

impl fmt::Display for ResolutionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionStep::Account => write!(f, "account lookup"),
            ResolutionStep::Summoner => write!(f, "summoner lookup"),
        }
    }
}

/// Identity lookup failed for one player.
#[derive(Debug, Error)]
#[error("Failed to resolve {player} ({step}): {source}")]
pub struct ResolutionError {
    pub player: PlayerRef,
    pub step: ResolutionStep,
    #[source]
    pub source: ClientError,
}

/// Resolve a roster entry to its summoner record. Does not retry.
pub async fn resolve_identity(
    api: &dyn LadderApi,
    player: &PlayerRef,
) -> Result<SummonerRecord, ResolutionError> {
    let fail = |step: ResolutionStep| {
        move |source: ClientError| ResolutionError {
            player: player.clone(),
            step,
            source,
        }
    };

    let account = api
        .account_by_riot_id(&player.name, &player.tag)
        .await
        .map_err(fail(ResolutionStep::Account))?;
    debug!("{} resolved to {}", player, account.puuid);

    let summoner = api
        .summoner_by_puuid(&account.puuid)
        .await
        .map_err(fail(ResolutionStep::Summoner))?;
    debug!("{} has summoner id {}", player, summoner.id);

    Ok(summoner)
}
