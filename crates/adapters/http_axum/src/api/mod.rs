//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod forecast;
#[allow(clippy::missing_errors_doc)]
pub mod measurements;
#[allow(clippy::missing_errors_doc)]
pub mod reservations;
#[allow(clippy::missing_errors_doc)]
pub mod rooms;
#[allow(clippy::missing_errors_doc)]
pub mod status;
#[allow(clippy::missing_errors_doc)]
pub mod weather;

use std::str::FromStr;

use axum::Router;
use axum::routing::get;
use chrono::{DateTime, NaiveDateTime};

use rate_app::ports::{
    ForecastModel, MeasurementLog, ReservationRepository, RoomRepository, WeatherProvider,
};
use rate_domain::error::ValidationError;
use rate_domain::id::RoomId;
use rate_domain::time::Timestamp;

use crate::error::ApiError;
use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<M, R, L, W, F>() -> Router<AppState<M, R, L, W, F>>
where
    M: RoomRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    L: MeasurementLog + Send + Sync + 'static,
    W: WeatherProvider + Send + Sync + 'static,
    F: ForecastModel + 'static,
{
    Router::new()
        // Rooms
        .route("/rooms", get(rooms::list::<M, R, L, W, F>))
        .route("/rooms/status", get(status::list::<M, R, L, W, F>))
        .route("/rooms/{id}", get(rooms::get::<M, R, L, W, F>))
        .route("/rooms/{id}/status", get(status::get::<M, R, L, W, F>))
        .route("/rooms/{id}/forecast", get(forecast::get::<M, R, L, W, F>))
        .route(
            "/rooms/{id}/measurements",
            get(measurements::list_for_room::<M, R, L, W, F>),
        )
        // Reservations
        .route(
            "/reservations",
            get(reservations::list::<M, R, L, W, F>)
                .post(reservations::create::<M, R, L, W, F>),
        )
        .route(
            "/reservations/{id}",
            get(reservations::get::<M, R, L, W, F>)
                .delete(reservations::delete::<M, R, L, W, F>),
        )
        // Measurements
        .route("/last", get(measurements::last::<M, R, L, W, F>))
        .route("/all", get(measurements::list::<M, R, L, W, F>))
        // Weather
        .route("/weather", get(weather::get::<M, R, L, W, F>))
}

/// Parse a room id path segment.
fn parse_room_id(raw: &str) -> Result<RoomId, ApiError> {
    RoomId::from_str(raw).map_err(|_| ValidationError::InvalidId(raw.to_owned()).into())
}

/// Parse a timestamp, treating values without an offset as UTC.
fn parse_timestamp(raw: &str) -> Result<Timestamp, ApiError> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.to_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ValidationError::InvalidTimestamp(raw.to_owned()).into())
}
