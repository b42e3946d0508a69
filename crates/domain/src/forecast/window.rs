//! Feature extraction and windowing of recent measurements.

use chrono::{Datelike, Timelike};

use super::{FEATURE_COUNT, MinMaxScaler, SEQ_LEN};
use crate::error::ForecastError;
use crate::measurement::Measurement;
use crate::weather::WeatherConditions;

/// One measurement flattened into model features.
pub type FeatureRow = [f64; FEATURE_COUNT];

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

/// Flatten `measurement` into a [`FeatureRow`].
///
/// Calendar features come from the UTC timestamp (weekday 0 = Monday).
/// `fallback` supplies outdoor conditions when the measurement has none.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn feature_row(measurement: &Measurement, fallback: &WeatherConditions) -> FeatureRow {
    let reading = &measurement.reading;
    let occupancy = &measurement.occupancy;
    let weather = measurement.weather.as_ref().unwrap_or(fallback);
    let weekday = measurement.recorded_at.weekday().num_days_from_monday();

    [
        reading.temperature,
        reading.humidity,
        reading.co2,
        flag(reading.motion),
        f64::from(measurement.recorded_at.hour()),
        f64::from(weekday),
        flag(weekday >= 5),
        f64::from(occupancy.people_count),
        f64::from(occupancy.room_capacity),
        occupancy.occupancy_rate,
        occupancy.minutes_to_start as f64,
        flag(occupancy.is_occupied),
        occupancy.res_duration_min as f64,
        weather.outdoor_temp,
        weather.outdoor_hum,
        weather.wind_speed,
    ]
}

/// The most recent [`SEQ_LEN`] measurements of one room, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureWindow {
    rows: Vec<FeatureRow>,
}

impl FeatureWindow {
    /// Build a window from a room's recent history.
    ///
    /// `history` may arrive in any order; it is sorted by timestamp (stable,
    /// so equal timestamps keep their log order) and the newest [`SEQ_LEN`]
    /// entries are kept.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::InsufficientHistory`] when fewer than
    /// [`SEQ_LEN`] measurements are given.
    pub fn from_history(
        mut history: Vec<Measurement>,
        fallback: &WeatherConditions,
    ) -> Result<Self, ForecastError> {
        if history.len() < SEQ_LEN {
            return Err(ForecastError::InsufficientHistory {
                required: SEQ_LEN,
                available: history.len(),
            });
        }

        history.sort_by_key(|m| m.recorded_at);
        let rows = history[history.len() - SEQ_LEN..]
            .iter()
            .map(|m| feature_row(m, fallback))
            .collect();

        Ok(Self { rows })
    }

    #[must_use]
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Apply the input scaler to every row.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::ShapeMismatch`] if the scaler was not fitted on
    /// [`FEATURE_COUNT`] columns.
    pub fn normalized(&self, scaler: &MinMaxScaler) -> Result<Vec<FeatureRow>, ForecastError> {
        self.rows
            .iter()
            .map(|row| {
                let mut scaled = *row;
                scaler.transform(&mut scaled)?;
                Ok(scaled)
            })
            .collect()
    }
}
