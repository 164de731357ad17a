pub mod memory;

use thiserror::Error;
use uuid::Uuid;

use crate::models::order::{Order, OrderStatus, RideDetails, StatusPatch, VehicleType};

pub use memory::MemoryOrderStore;

/// Transient store-level failure. One-shot operations surface it to the
/// caller; the status-check loop logs it and keeps ticking.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of a conditional status transition.
#[derive(Debug)]
pub enum Transition {
    Committed(Order),
    Rejected,
    NotFound,
}

/// Document-style order store. The backing technology is interchangeable;
/// the one hard requirement is that `conditional_transition` is atomic per
/// document ("update where id = X and status = expected"), never a
/// read-then-write across two calls.
pub trait OrderStore: Send + Sync {
    fn create(&self, order: Order) -> Result<Order, StoreError>;

    fn get(&self, id: Uuid) -> Result<Option<Order>, StoreError>;

    /// Patches the second-step ride fields. Does not touch status.
    fn update_details(&self, id: Uuid, details: RideDetails) -> Result<Option<Order>, StoreError>;

    /// The only mutation path for status changes after creation.
    fn conditional_transition(
        &self,
        id: Uuid,
        expected: OrderStatus,
        patch: StatusPatch,
    ) -> Result<Transition, StoreError>;

    /// Live query behind the matching view: waiting orders for one vehicle
    /// type. Results are a snapshot of a single read, never cached.
    fn find_waiting(&self, vehicle_type: VehicleType) -> Result<Vec<Order>, StoreError>;

    fn len(&self) -> usize;
}
