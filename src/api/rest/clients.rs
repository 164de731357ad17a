use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::{lifecycle, status_check};
use crate::error::AppError;
use crate::geo::haversine_km;
use crate::models::order::{GeoPoint, Order, OrderStatus, RideDetails, VehicleType};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/details", post(submit_details))
        .route("/orders/:id/cancel", post(cancel_order))
        .route("/orders/:id/status-check", post(start_status_check))
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub client_id: String,
    pub client_name: String,
    pub origin: GeoPoint,
    pub destination: GeoPoint,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    if payload.client_id.trim().is_empty() {
        return Err(AppError::BadRequest("client_id cannot be empty".to_string()));
    }

    let order = Order {
        id: Uuid::new_v4(),
        client_id: payload.client_id,
        client_name: payload.client_name,
        driver_id: None,
        driver_name: None,
        vehicle_type: None,
        passengers: None,
        departure_at: None,
        origin: payload.origin,
        destination: payload.destination,
        distance_km: haversine_km(&payload.origin, &payload.destination),
        price: 0.0,
        status: OrderStatus::Waiting,
        created_at: Utc::now(),
        completed_at: None,
    };

    let order = state.store.create(order)?;
    Ok(Json(order))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .store
        .get(id)?
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

    Ok(Json(order))
}

#[derive(Deserialize)]
pub struct RideDetailsRequest {
    pub passengers: u8,
    pub vehicle_type: VehicleType,
    pub departure_at: DateTime<Utc>,
}

async fn submit_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RideDetailsRequest>,
) -> Result<Json<Order>, AppError> {
    if payload.passengers == 0 {
        return Err(AppError::BadRequest(
            "passengers must be at least 1".to_string(),
        ));
    }

    let order = state
        .store
        .get(id)?
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

    if order.status != OrderStatus::Waiting {
        return Err(AppError::Conflict("order is no longer waiting".to_string()));
    }

    // Vehicle type is immutable once submitted; the price goes with it.
    if order.vehicle_type.is_some() {
        return Err(AppError::Conflict(
            "ride details already submitted".to_string(),
        ));
    }

    let details = RideDetails {
        passengers: payload.passengers,
        vehicle_type: payload.vehicle_type,
        departure_at: payload.departure_at,
        price: state.fares.price(order.distance_km, payload.vehicle_type),
    };

    let updated = state
        .store
        .update_details(id, details)?
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

    Ok(Json(updated))
}

#[derive(Deserialize)]
pub struct CancelOrderRequest {
    pub client_id: String,
}

async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelOrderRequest>,
) -> Result<Json<Order>, AppError> {
    let order = lifecycle::cancel_order(&state, id, &payload.client_id)?;
    Ok(Json(order))
}

#[derive(Deserialize)]
pub struct StatusCheckRequest {
    pub client_id: String,
}

#[derive(Serialize)]
pub struct StatusCheckResponse {
    pub order_id: Uuid,
    pub client_id: String,
    pub interval_secs: u64,
}

async fn start_status_check(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusCheckRequest>,
) -> Result<Json<StatusCheckResponse>, AppError> {
    let order = state
        .store
        .get(id)?
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

    if order.status.is_terminal() {
        return Err(AppError::NotFound(format!("order {id} is no longer active")));
    }

    status_check::start(&state, id, payload.client_id.clone());

    Ok(Json(StatusCheckResponse {
        order_id: id,
        client_id: payload.client_id,
        interval_secs: state.status_check_interval.as_secs(),
    }))
}
