use std::env;
use std::time::Duration;

use crate::engine::pricing::FareTable;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub event_buffer_size: usize,
    pub status_check_interval: Duration,
    pub fares: FareTable,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            status_check_interval: Duration::from_secs(parse_or_default(
                "STATUS_CHECK_INTERVAL_SECS",
                15,
            )?),
            fares: FareTable {
                car_per_km: parse_or_default("FARE_CAR_PER_KM", 0.5)?,
                van_per_km: parse_or_default("FARE_VAN_PER_KM", 0.8)?,
                horse_drawn_per_km: parse_or_default("FARE_HORSE_DRAWN_PER_KM", 1.2)?,
            },
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
