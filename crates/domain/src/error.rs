//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`RateError`]
//! via `From`, so callers can match on the failure category.

use crate::id::{ReservationId, RoomId};
use crate::time::Timestamp;

/// Top-level error for every fallible domain and application operation.
#[derive(Debug, thiserror::Error)]
pub enum RateError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("conflict")]
    Conflict(#[from] ConflictError),

    #[error("forecast error")]
    Forecast(#[from] ForecastError),

    #[error("storage error")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

/// A domain invariant was violated by the caller's input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("room capacity must be positive")]
    InvalidCapacity,

    #[error("title must not be empty")]
    EmptyTitle,

    #[error("user name must not be empty")]
    EmptyUserName,

    #[error("reservation must end after it starts (start {start}, end {end})")]
    InvalidInterval { start: Timestamp, end: Timestamp },

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("incomplete {group} context, missing {missing}")]
    PartialContext {
        group: &'static str,
        missing: &'static str,
    },
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A reservation request overlaps an existing booking of the same room.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("room {room_id} is already booked by reservation {existing} for that slot")]
pub struct ConflictError {
    pub room_id: RoomId,
    pub existing: ReservationId,
}

/// Forecasting could not produce a prediction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForecastError {
    /// Fewer stored measurements than the model's sequence length.
    #[error("not enough data: {available} measurements available, {required} required")]
    InsufficientHistory { required: usize, available: usize },

    /// No inference artifact was loaded at startup.
    #[error("forecast model unavailable")]
    ModelUnavailable,

    /// The window or artifact dimensions disagree.
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}

/// The weather collaborator could not deliver current conditions.
///
/// Never surfaced to callers: the weather service substitutes defaults.
#[derive(Debug, thiserror::Error)]
#[error("weather unavailable")]
pub struct WeatherUnavailable(#[source] pub Box<dyn std::error::Error + Send + Sync>);

/// A sensor could not produce a reading.
#[derive(Debug, thiserror::Error)]
#[error("sensor read failed")]
pub struct SensorFailure(#[source] pub Box<dyn std::error::Error + Send + Sync>);
