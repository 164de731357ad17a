use std::sync::Arc;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::event::Event;
use crate::models::order::OrderStatus;
use crate::pubsub::Topic;
use crate::state::AppState;

/// One poll task per (order, requester). The composite key keeps checks for
/// different orders and different clients fully independent: starting,
/// finishing, or cancelling one never touches another.
pub type CheckKey = (Uuid, String);

#[derive(Default)]
pub struct StatusChecks {
    tasks: DashMap<CheckKey, JoinHandle<()>>,
}

impl StatusChecks {
    pub fn new() -> Self {
        Self {
            tasks: DashMap::new(),
        }
    }

    /// Registers a task under its key, replacing (and aborting) any earlier
    /// check for the same key.
    fn insert(&self, key: CheckKey, handle: JoinHandle<()>) {
        if let Some(previous) = self.tasks.insert(key, handle) {
            previous.abort();
        }
    }

    /// Stops future ticks for one key. An in-flight tick body is not
    /// interrupted: the abort lands at the task's next sleep point.
    pub fn cancel(&self, key: &CheckKey) -> bool {
        match self.tasks.remove(key) {
            Some((_, handle)) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Removes a task's own registration once it has run to completion.
    fn finish(&self, key: &CheckKey) {
        self.tasks.remove(key);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Schedules the polling fallback for one client's order: re-read the order
/// every interval until it leaves `waiting`, emit the acceptance event at
/// most once, then stop.
pub fn start(state: &Arc<AppState>, order_id: Uuid, client_id: String) {
    let key: CheckKey = (order_id, client_id.clone());

    let task_state = state.clone();
    let task_key = key.clone();
    let handle = tokio::spawn(async move {
        run_check(task_state, task_key, order_id, client_id).await;
    });

    state.checks.insert(key, handle);
    state
        .metrics
        .active_status_checks
        .set(state.checks.len() as i64);

    info!(order_id = %order_id, "status check scheduled");
}

async fn run_check(state: Arc<AppState>, key: CheckKey, order_id: Uuid, client_id: String) {
    let period = state.status_check_interval;

    loop {
        sleep(period).await;

        match state.store.get(order_id) {
            // Transient failures keep the check alive; only order
            // disappearance is terminal.
            Err(err) => {
                warn!(order_id = %order_id, error = %err, "status check tick failed");
                continue;
            }
            Ok(None) => {
                info!(order_id = %order_id, "order gone; stopping status check");
                break;
            }
            Ok(Some(order)) => match order.status {
                OrderStatus::Waiting => {
                    debug!(order_id = %order_id, "order still waiting");
                }
                OrderStatus::Accepted => {
                    let driver_name = order.driver_name.unwrap_or_default();
                    state.topics.publish(
                        &Topic::Client(client_id.clone()),
                        Event::OrderAccepted {
                            order_id,
                            driver_name,
                        },
                    );
                    info!(order_id = %order_id, "status check delivered acceptance");
                    break;
                }
                OrderStatus::Completed | OrderStatus::Cancelled => {
                    info!(order_id = %order_id, "order terminal; stopping status check");
                    break;
                }
            },
        }
    }

    state.checks.finish(&key);
    state
        .metrics
        .active_status_checks
        .set(state.checks.len() as i64);
}
