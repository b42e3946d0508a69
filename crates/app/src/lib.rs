//! # rate-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `RoomRepository`: room metadata
//!   - `ReservationRepository`: reservation persistence and interval queries
//!   - `MeasurementLog`: append-only per-room readings
//!   - `WeatherProvider`: current outdoor conditions
//!   - `SensorSource`: one reading from a physical or simulated sensor
//!   - `ForecastModel`: inference on a normalized feature window
//! - Define **driving/inbound** use-cases:
//!   - `ReservationService`: conflict-checked booking, current/upcoming queries
//!   - `WeatherService`: cached weather with default fallback
//!   - `ForecastService`: window → scale → infer → unscale
//!   - `Orchestrator`: per-room status, forecast and measurement ingestion
//!   - `SensorPoller`: periodic sensor reads fed into ingestion
//!
//! ## Dependency rule
//! Depends on `rate-domain` only (plus `tokio::sync`/`tokio::time`).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod orchestrator;
pub mod ports;
pub mod sensor_poller;
pub mod services;

#[cfg(test)]
mod testing;
