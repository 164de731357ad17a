use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::event::Event;
use crate::models::order::{Order, OrderStatus, StatusPatch};
use crate::pubsub::Topic;
use crate::state::AppState;
use crate::store::Transition;

/// Resolves a driver's claim on a waiting order. The whole race collapses
/// into the store's conditional transition: whichever driver's predicate
/// holds wins, everyone else sees the rejection as `AlreadyTaken`. A
/// rejected predicate also covers orders cancelled in the meantime.
pub fn accept_order(
    state: &AppState,
    order_id: Uuid,
    driver_id: String,
    driver_name: String,
) -> Result<Order, AppError> {
    let start = Instant::now();
    let outcome = state.store.conditional_transition(
        order_id,
        OrderStatus::Waiting,
        StatusPatch::accept(driver_id.clone(), driver_name.clone()),
    )?;

    match outcome {
        Transition::Committed(order) => {
            state.metrics.observe_accept("committed", start.elapsed().as_secs_f64());

            // Fire-and-forget push to the owning client; a client without a
            // live subscription falls back to its status check.
            let delivered = state.topics.publish(
                &Topic::Client(order.client_id.clone()),
                Event::OrderAccepted {
                    order_id: order.id,
                    driver_name,
                },
            );

            info!(
                order_id = %order.id,
                driver_id = %driver_id,
                push_delivered = delivered,
                "order accepted"
            );

            Ok(order)
        }
        Transition::Rejected => {
            state.metrics.observe_accept("lost_race", start.elapsed().as_secs_f64());
            Err(AppError::AlreadyTaken)
        }
        Transition::NotFound => {
            state.metrics.observe_accept("not_found", start.elapsed().as_secs_f64());
            Err(AppError::NotFound(format!("order {order_id} not found")))
        }
    }
}

/// Ends an accepted ride: stamps the completion time, tells the room and
/// tears it down. Only the accepting driver may complete.
pub fn complete_ride(
    state: &AppState,
    order_id: Uuid,
    driver_id: &str,
    completed_at: DateTime<Utc>,
) -> Result<Order, AppError> {
    let current = state
        .store
        .get(order_id)?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

    if current.driver_id.as_deref() != Some(driver_id) {
        return Err(AppError::Conflict(
            "ride belongs to another driver".to_string(),
        ));
    }

    let outcome = state.store.conditional_transition(
        order_id,
        OrderStatus::Accepted,
        StatusPatch::complete(completed_at),
    )?;

    match outcome {
        Transition::Committed(order) => {
            let room = Topic::Room(order.id);
            state.topics.publish(&room, Event::RideEnded { room_id: order.id });
            state.topics.close(&room);

            info!(order_id = %order.id, driver_id = %driver_id, "ride completed");
            Ok(order)
        }
        Transition::Rejected => Err(AppError::Conflict("ride is not in progress".to_string())),
        Transition::NotFound => Err(AppError::NotFound(format!("order {order_id} not found"))),
    }
}

/// Client-side cancellation of a not-yet-accepted order. The cancelled
/// document is retained for history reads; any later accept attempt fails
/// its predicate. The caller's own status check for this order is stopped,
/// checks held by other clients or for other orders are untouched.
pub fn cancel_order(state: &AppState, order_id: Uuid, client_id: &str) -> Result<Order, AppError> {
    let outcome =
        state
            .store
            .conditional_transition(order_id, OrderStatus::Waiting, StatusPatch::cancel())?;

    match outcome {
        Transition::Committed(order) => {
            state.checks.cancel(&(order_id, client_id.to_string()));
            state
                .metrics
                .active_status_checks
                .set(state.checks.len() as i64);

            info!(order_id = %order.id, client_id = %client_id, "order cancelled");
            Ok(order)
        }
        Transition::Rejected => Err(AppError::Conflict(
            "order was already accepted".to_string(),
        )),
        Transition::NotFound => Err(AppError::NotFound(format!("order {order_id} not found"))),
    }
}
