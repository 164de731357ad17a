use crate::models::order::VehicleType;

/// Per-km fare rates, one per vehicle type. The enum is closed, so every
/// priced order has a defined rate.
#[derive(Debug, Clone)]
pub struct FareTable {
    pub car_per_km: f64,
    pub van_per_km: f64,
    pub horse_drawn_per_km: f64,
}

impl FareTable {
    pub fn rate(&self, vehicle_type: VehicleType) -> f64 {
        match vehicle_type {
            VehicleType::Car => self.car_per_km,
            VehicleType::Van => self.van_per_km,
            VehicleType::HorseDrawn => self.horse_drawn_per_km,
        }
    }

    pub fn price(&self, distance_km: f64, vehicle_type: VehicleType) -> f64 {
        distance_km * self.rate(vehicle_type)
    }
}

impl Default for FareTable {
    fn default() -> Self {
        Self {
            car_per_km: 0.5,
            van_per_km: 0.8,
            horse_drawn_per_km: 1.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FareTable;
    use crate::models::order::VehicleType;

    #[test]
    fn car_fare_is_half_the_distance() {
        let fares = FareTable::default();
        let price = fares.price(6.4, VehicleType::Car);
        assert!((price - 3.2).abs() < 1e-9);
    }

    #[test]
    fn each_vehicle_type_has_its_own_rate() {
        let fares = FareTable {
            car_per_km: 0.5,
            van_per_km: 0.8,
            horse_drawn_per_km: 1.2,
        };

        assert!(fares.price(10.0, VehicleType::Van) > fares.price(10.0, VehicleType::Car));
        assert!(
            fares.price(10.0, VehicleType::HorseDrawn) > fares.price(10.0, VehicleType::Van)
        );
    }
}
