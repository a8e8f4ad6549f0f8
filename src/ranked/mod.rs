//! Ranked stats lookup and solo-queue selection.

use thiserror::Error;
use tracing::debug;

use crate::fetch::{ClientError, LadderApi};
use crate::models::{RankedEntry, SummonerId};

/// League lookup failed for one summoner.
#[derive(Debug, Error)]
#[error("Failed to fetch ranked entries for summoner {summoner_id}: {source}")]
pub struct FetchError {
    pub summoner_id: SummonerId,
    #[source]
    pub source: ClientError,
}

/// Retrieve every queue entry of a summoner. Does not retry.
pub async fn fetch_ranked_entries(
    api: &dyn LadderApi,
    summoner_id: &SummonerId,
) -> Result<Vec<RankedEntry>, FetchError> {
    api.entries_by_summoner(summoner_id)
        .await
        .map_err(|source| FetchError {
            summoner_id: summoner_id.clone(),
            source,
        })
}

/// Pick the solo-queue entry. `None` means the player is unranked in solo queue.
pub fn select_solo_queue(entries: Vec<RankedEntry>) -> Option<RankedEntry> {
    entries.into_iter().find(RankedEntry::is_solo_queue)
}

/// Fetch and select in one step.
pub async fn fetch_solo_queue(
    api: &dyn LadderApi,
    summoner_id: &SummonerId,
) -> Result<Option<RankedEntry>, FetchError> {
    let entries = fetch_ranked_entries(api, summoner_id).await?;
    debug!("{} queue entries for {}", entries.len(), summoner_id);
    Ok(select_solo_queue(entries))
}
