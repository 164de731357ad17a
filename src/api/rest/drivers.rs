use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::{lifecycle, matching};
use crate::error::AppError;
use crate::models::order::{Order, PendingRide, VehicleType};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders/pending", get(list_pending))
        .route("/orders/:id/accept", post(accept_order))
        .route("/orders/:id/complete", post(complete_ride))
}

#[derive(Deserialize)]
pub struct PendingQuery {
    pub vehicle_type: VehicleType,
}

async fn list_pending(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PendingQuery>,
) -> Result<Json<Vec<PendingRide>>, AppError> {
    let rides = matching::pending_for(state.store.as_ref(), query.vehicle_type)?;
    Ok(Json(rides))
}

#[derive(Deserialize)]
pub struct AcceptOrderRequest {
    pub driver_id: String,
    pub driver_name: String,
}

async fn accept_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AcceptOrderRequest>,
) -> Result<Json<Order>, AppError> {
    if payload.driver_id.trim().is_empty() {
        return Err(AppError::BadRequest("driver_id cannot be empty".to_string()));
    }

    let order = lifecycle::accept_order(&state, id, payload.driver_id, payload.driver_name)?;
    Ok(Json(order))
}

#[derive(Deserialize)]
pub struct CompleteRideRequest {
    pub driver_id: String,
    pub completed_at: Option<DateTime<Utc>>,
}

async fn complete_ride(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompleteRideRequest>,
) -> Result<Json<Order>, AppError> {
    let completed_at = payload.completed_at.unwrap_or_else(Utc::now);
    let order = lifecycle::complete_ride(&state, id, &payload.driver_id, completed_at)?;
    Ok(Json(order))
}
