//! In-memory [`LadderApi`] for tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use super::{ClientError, LadderApi};
use crate::models::{Account, Puuid, RankedEntry, SummonerId, SummonerRecord};

/// Fake provider. Unknown Riot IDs answer 404.
#[derive(Default)]
pub struct FakeApi {
    accounts: HashMap<(String, String), Puuid>,
    summoners: HashMap<Puuid, SummonerId>,
    entries: HashMap<SummonerId, Vec<RankedEntry>>,
    failing_summoners: HashSet<Puuid>,
    failing_entries: HashSet<SummonerId>,
    delays: HashMap<String, Duration>,
    gate: Option<Arc<Semaphore>>,
    account_calls: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a player whose lookups all succeed.
    pub fn with_player(mut self, name: &str, tag: &str, entries: Vec<RankedEntry>) -> Self {
        let puuid = Puuid::new(format!("puuid-{}", name));
        let summoner_id = SummonerId::new(format!("summoner-{}", name));
        self.accounts
            .insert((name.to_string(), tag.to_string()), puuid.clone());
        self.summoners.insert(puuid, summoner_id.clone());
        self.entries.insert(summoner_id, entries);
        self
    }

    /// Register a player whose summoner lookup answers 500.
    pub fn with_failing_summoner(mut self, name: &str, tag: &str) -> Self {
        let puuid = Puuid::new(format!("puuid-{}", name));
        self.accounts
            .insert((name.to_string(), tag.to_string()), puuid.clone());
        self.failing_summoners.insert(puuid);
        self
    }

    /// Register a player whose league lookup answers 500.
    pub fn with_failing_entries(mut self, name: &str, tag: &str) -> Self {
        self = self.with_player(name, tag, Vec::new());
        self.failing_entries
            .insert(SummonerId::new(format!("summoner-{}", name)));
        self
    }

    /// Delay the account lookup of one player.
    pub fn with_delay(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_string(), delay);
        self
    }

    /// Block every account lookup until the semaphore has a permit.
    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn account_calls(&self) -> usize {
        self.account_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LadderApi for FakeApi {
    async fn account_by_riot_id(&self, name: &str, tag: &str) -> Result<Account, ClientError> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            let _permit = gate
                .acquire()
                .await
                .map_err(|_| ClientError::InvalidUrl("gate closed".to_string()))?;
        }
        if let Some(delay) = self.delays.get(name) {
            tokio::time::sleep(*delay).await;
        }

        self.accounts
            .get(&(name.to_string(), tag.to_string()))
            .map(|puuid| Account {
                puuid: puuid.clone(),
                game_name: Some(name.to_string()),
                tag_line: Some(tag.to_string()),
            })
            .ok_or_else(|| ClientError::NotFound(format!("{}#{}", name, tag)))
    }

    async fn summoner_by_puuid(&self, puuid: &Puuid) -> Result<SummonerRecord, ClientError> {
        if self.failing_summoners.contains(puuid) {
            return Err(ClientError::HttpStatus {
                status: 500,
                message: "Internal Server Error".to_string(),
            });
        }

        self.summoners
            .get(puuid)
            .map(|id| SummonerRecord {
                id: id.clone(),
                puuid: puuid.clone(),
                summoner_level: Some(100),
                profile_icon_id: None,
            })
            .ok_or_else(|| ClientError::NotFound(puuid.to_string()))
    }

    async fn entries_by_summoner(
        &self,
        summoner_id: &SummonerId,
    ) -> Result<Vec<RankedEntry>, ClientError> {
        if self.failing_entries.contains(summoner_id) {
            return Err(ClientError::HttpStatus {
                status: 500,
                message: "Internal Server Error".to_string(),
            });
        }

        Ok(self.entries.get(summoner_id).cloned().unwrap_or_default())
    }
}
