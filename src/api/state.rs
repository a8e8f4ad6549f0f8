use std::sync::Arc;

use crate::scheduler::RefreshScheduler;
use crate::storage::SnapshotStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SnapshotStore>,
    pub scheduler: Arc<RefreshScheduler>,
}

impl AppState {
    pub fn new(scheduler: Arc<RefreshScheduler>) -> Self {
        Self {
            store: scheduler.store().clone(),
            scheduler,
        }
    }
}
