use crate::models::order::{PendingRide, VehicleType};
use crate::store::{OrderStore, StoreError};

/// Driver-facing view of claimable orders. Each call re-reads the live
/// store; an order can vanish between two reads by being accepted, which is
/// resolved by the conditional transition, not by freshness. Ordering is
/// unspecified; driver clients re-sort as they see fit.
pub fn pending_for(
    store: &dyn OrderStore,
    vehicle_type: VehicleType,
) -> Result<Vec<PendingRide>, StoreError> {
    let rides = store
        .find_waiting(vehicle_type)?
        .into_iter()
        .map(|order| PendingRide {
            id: order.id,
            origin: order.origin,
            destination: order.destination,
            distance_km: order.distance_km,
            price: order.price,
        })
        .collect();

    Ok(rides)
}
