use dashmap::DashMap;
use uuid::Uuid;

use crate::models::order::{Order, OrderStatus, RideDetails, StatusPatch, VehicleType};
use crate::store::{OrderStore, StoreError, Transition};

/// In-memory stand-in for the document store. Each entry guard covers the
/// whole check-and-patch of a conditional transition, so two racing accepts
/// observe the predicate serially.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: DashMap<Uuid, Order>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self {
            orders: DashMap::new(),
        }
    }
}

impl OrderStore for MemoryOrderStore {
    fn create(&self, order: Order) -> Result<Order, StoreError> {
        self.orders.insert(order.id, order.clone());
        Ok(order)
    }

    fn get(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.get(&id).map(|entry| entry.value().clone()))
    }

    fn update_details(&self, id: Uuid, details: RideDetails) -> Result<Option<Order>, StoreError> {
        let Some(mut entry) = self.orders.get_mut(&id) else {
            return Ok(None);
        };

        entry.passengers = Some(details.passengers);
        entry.vehicle_type = Some(details.vehicle_type);
        entry.departure_at = Some(details.departure_at);
        entry.price = details.price;

        Ok(Some(entry.clone()))
    }

    fn conditional_transition(
        &self,
        id: Uuid,
        expected: OrderStatus,
        patch: StatusPatch,
    ) -> Result<Transition, StoreError> {
        let Some(mut entry) = self.orders.get_mut(&id) else {
            return Ok(Transition::NotFound);
        };

        if entry.status != expected {
            return Ok(Transition::Rejected);
        }

        entry.status = patch.status;
        if let Some((driver_id, driver_name)) = patch.driver {
            entry.driver_id = Some(driver_id);
            entry.driver_name = Some(driver_name);
        }
        if let Some(completed_at) = patch.completed_at {
            entry.completed_at = Some(completed_at);
        }

        Ok(Transition::Committed(entry.clone()))
    }

    fn find_waiting(&self, vehicle_type: VehicleType) -> Result<Vec<Order>, StoreError> {
        let orders = self
            .orders
            .iter()
            .filter(|entry| {
                let order = entry.value();
                order.status == OrderStatus::Waiting && order.vehicle_type == Some(vehicle_type)
            })
            .map(|entry| entry.value().clone())
            .collect();

        Ok(orders)
    }

    fn len(&self) -> usize {
        self.orders.len()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::MemoryOrderStore;
    use crate::models::order::{GeoPoint, Order, OrderStatus, StatusPatch, VehicleType};
    use crate::store::{OrderStore, Transition};

    fn waiting_order(vehicle: Option<VehicleType>) -> Order {
        Order {
            id: Uuid::new_v4(),
            client_id: "client-1".to_string(),
            client_name: "Ada".to_string(),
            driver_id: None,
            driver_name: None,
            vehicle_type: vehicle,
            passengers: None,
            departure_at: None,
            origin: GeoPoint { lat: 48.81, lng: 2.36 },
            destination: GeoPoint { lat: 48.85, lng: 2.30 },
            distance_km: 6.0,
            price: 0.0,
            status: OrderStatus::Waiting,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn transition_commits_when_status_matches() {
        let store = MemoryOrderStore::new();
        let order = store.create(waiting_order(Some(VehicleType::Car))).unwrap();

        let outcome = store
            .conditional_transition(
                order.id,
                OrderStatus::Waiting,
                StatusPatch::accept("driver-1".to_string(), "Dan".to_string()),
            )
            .unwrap();

        match outcome {
            Transition::Committed(updated) => {
                assert_eq!(updated.status, OrderStatus::Accepted);
                assert_eq!(updated.driver_id.as_deref(), Some("driver-1"));
                assert_eq!(updated.driver_name.as_deref(), Some("Dan"));
            }
            other => panic!("expected commit, got {other:?}"),
        }
    }

    #[test]
    fn transition_rejects_when_status_moved() {
        let store = MemoryOrderStore::new();
        let order = store.create(waiting_order(Some(VehicleType::Car))).unwrap();

        store
            .conditional_transition(
                order.id,
                OrderStatus::Waiting,
                StatusPatch::accept("driver-1".to_string(), "Dan".to_string()),
            )
            .unwrap();

        let second = store
            .conditional_transition(
                order.id,
                OrderStatus::Waiting,
                StatusPatch::accept("driver-2".to_string(), "Eve".to_string()),
            )
            .unwrap();

        assert!(matches!(second, Transition::Rejected));
        let stored = store.get(order.id).unwrap().unwrap();
        assert_eq!(stored.driver_id.as_deref(), Some("driver-1"));
    }

    #[test]
    fn transition_reports_missing_order() {
        let store = MemoryOrderStore::new();
        let outcome = store
            .conditional_transition(Uuid::new_v4(), OrderStatus::Waiting, StatusPatch::cancel())
            .unwrap();

        assert!(matches!(outcome, Transition::NotFound));
    }

    #[test]
    fn find_waiting_filters_status_and_vehicle() {
        let store = MemoryOrderStore::new();
        let car = store.create(waiting_order(Some(VehicleType::Car))).unwrap();
        store.create(waiting_order(Some(VehicleType::Van))).unwrap();
        store.create(waiting_order(None)).unwrap();

        let accepted = store.create(waiting_order(Some(VehicleType::Car))).unwrap();
        store
            .conditional_transition(
                accepted.id,
                OrderStatus::Waiting,
                StatusPatch::accept("driver-1".to_string(), "Dan".to_string()),
            )
            .unwrap();

        let pending = store.find_waiting(VehicleType::Car).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, car.id);
    }
}
