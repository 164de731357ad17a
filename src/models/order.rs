use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum VehicleType {
    Car,
    Van,
    HorseDrawn,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Waiting,
    Accepted,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

/// A single ride request. The status field is only ever written through the
/// store's conditional transition after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub client_id: String,
    pub client_name: String,
    pub driver_id: Option<String>,
    pub driver_name: Option<String>,
    pub vehicle_type: Option<VehicleType>,
    pub passengers: Option<u8>,
    pub departure_at: Option<DateTime<Utc>>,
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub distance_km: f64,
    pub price: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Second-step ride details, persisted together with the computed price.
#[derive(Debug, Clone)]
pub struct RideDetails {
    pub passengers: u8,
    pub vehicle_type: VehicleType,
    pub departure_at: DateTime<Utc>,
    pub price: f64,
}

/// Field patch applied by a conditional status transition, the in-memory
/// equivalent of a `$set` document.
#[derive(Debug, Clone)]
pub struct StatusPatch {
    pub status: OrderStatus,
    pub driver: Option<(String, String)>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl StatusPatch {
    pub fn accept(driver_id: String, driver_name: String) -> Self {
        Self {
            status: OrderStatus::Accepted,
            driver: Some((driver_id, driver_name)),
            completed_at: None,
        }
    }

    pub fn complete(completed_at: DateTime<Utc>) -> Self {
        Self {
            status: OrderStatus::Completed,
            driver: None,
            completed_at: Some(completed_at),
        }
    }

    pub fn cancel() -> Self {
        Self {
            status: OrderStatus::Cancelled,
            driver: None,
            completed_at: None,
        }
    }
}

/// Driver-facing projection of a waiting order.
#[derive(Debug, Clone, Serialize)]
pub struct PendingRide {
    pub id: Uuid,
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub distance_km: f64,
    pub price: f64,
}
