//! Refresh scheduler.
//!
//! Runs one aggregation cycle at startup and then one per period. At most
//! one cycle is in flight: a trigger that fires while a cycle holds the
//! permit is skipped, whether it came from the timer or from the API.
//! A failed cycle is logged and recorded, and the loop carries on.
//! [`RefreshScheduler::shutdown`] closes the guard: no cycle starts after
//! it, and the periodic loop ends at its next tick.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{OwnedSemaphorePermit, RwLock, Semaphore, TryAcquireError};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::pipeline::{Aggregator, CycleFailure, CycleReport};
use crate::storage::SnapshotStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RefreshStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

/// Progress and history of refresh cycles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshState {
    pub status: RefreshStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_report: Option<CycleReport>,
    /// Player failures of the last cycle, or the reason it failed as a whole
    pub errors: Vec<String>,
    pub cycles_completed: u64,
    pub cycles_failed: u64,
    pub skipped_triggers: u64,
}

/// Result of a trigger.
#[derive(Debug)]
pub enum TriggerOutcome {
    /// A cycle was spawned
    Started(JoinHandle<()>),
    /// A cycle was already in flight
    Skipped,
    /// The scheduler was shut down
    Closed,
}

impl TriggerOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, TriggerOutcome::Started(_))
    }
}

pub struct RefreshScheduler {
    aggregator: Aggregator,
    store: Arc<SnapshotStore>,
    period: Duration,
    in_flight: Arc<Semaphore>,
    state: RwLock<RefreshState>,
}

impl RefreshScheduler {
    pub fn new(aggregator: Aggregator, store: Arc<SnapshotStore>, period: Duration) -> Self {
        Self {
            aggregator,
            store,
            period,
            in_flight: Arc::new(Semaphore::new(1)),
            state: RwLock::new(RefreshState::default()),
        }
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// Current refresh state.
    pub async fn state(&self) -> RefreshState {
        self.state.read().await.clone()
    }

    /// Whether a cycle currently holds the permit.
    pub fn is_running(&self) -> bool {
        self.in_flight.available_permits() == 0
    }

    /// Stop starting cycles. A cycle already in flight runs to completion.
    pub fn shutdown(&self) {
        self.in_flight.close();
        info!("Refresh scheduler shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.in_flight.is_closed()
    }

    /// Spawn the periodic loop.
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Trigger immediately, then every period, until shut down.
    pub async fn run(self: Arc<Self>) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Starting periodic refresh every {:?}", self.period);

        loop {
            ticker.tick().await;
            if let TriggerOutcome::Closed = self.try_trigger().await {
                info!("Periodic refresh stopped");
                return;
            }
        }
    }

    /// Start a cycle in the background unless one is already in flight.
    pub async fn try_trigger(self: &Arc<Self>) -> TriggerOutcome {
        let permit = match self.in_flight.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(TryAcquireError::Closed) => return TriggerOutcome::Closed,
            Err(TryAcquireError::NoPermits) => {
                warn!("Refresh already in progress, skipping trigger");
                self.state.write().await.skipped_triggers += 1;
                return TriggerOutcome::Skipped;
            }
        };

        self.mark_started().await;

        let scheduler = self.clone();
        TriggerOutcome::Started(tokio::spawn(async move {
            let _ = scheduler.execute(permit).await;
        }))
    }

    /// Run one cycle inline, waiting for any in-flight cycle to finish first.
    ///
    /// Fails with [`CycleFailure::SchedulerClosed`] once shut down.
    pub async fn run_once(&self) -> Result<CycleReport, CycleFailure> {
        let permit = self
            .in_flight
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| CycleFailure::SchedulerClosed)?;

        self.mark_started().await;
        self.execute(permit).await
    }

    async fn mark_started(&self) {
        let mut state = self.state.write().await;
        state.status = RefreshStatus::Running;
        state.started_at = Some(Utc::now());
        state.completed_at = None;
    }

    /// Aggregate and save while holding the permit, then record the outcome.
    async fn execute(&self, _permit: OwnedSemaphorePermit) -> Result<CycleReport, CycleFailure> {
        let result = self.cycle().await;

        let mut state = self.state.write().await;
        state.completed_at = Some(Utc::now());
        match &result {
            Ok(report) => {
                state.status = RefreshStatus::Completed;
                state.errors = report.failures.clone();
                state.last_report = Some(report.clone());
                state.cycles_completed += 1;
            }
            Err(e) => {
                error!("Refresh cycle failed: {}", e);
                state.status = RefreshStatus::Failed;
                state.errors = vec![e.to_string()];
                state.cycles_failed += 1;
            }
        }

        result
    }

    async fn cycle(&self) -> Result<CycleReport, CycleFailure> {
        let (snapshot, report) = self.aggregator.aggregate_with_report().await?;
        self.store.save(snapshot).await?;
        Ok(report)
    }
}
