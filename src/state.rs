use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::engine::pricing::FareTable;
use crate::engine::status_check::StatusChecks;
use crate::observability::metrics::Metrics;
use crate::pubsub::Topics;
use crate::store::{MemoryOrderStore, OrderStore};

/// Shared per-process state. The order store is the single synchronization
/// point; nothing else here is load-bearing for correctness under race.
pub struct AppState {
    pub store: Arc<dyn OrderStore>,
    pub topics: Topics,
    pub checks: StatusChecks,
    pub fares: FareTable,
    pub status_check_interval: Duration,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self::with_store(config, Arc::new(MemoryOrderStore::new()))
    }

    /// Builds state around a caller-provided store implementation.
    pub fn with_store(config: &Config, store: Arc<dyn OrderStore>) -> Self {
        Self {
            store,
            topics: Topics::new(config.event_buffer_size),
            checks: StatusChecks::new(),
            fares: config.fares.clone(),
            status_check_interval: config.status_check_interval,
            metrics: Metrics::new(),
        }
    }
}
