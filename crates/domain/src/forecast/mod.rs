//! Forecast inputs and outputs.
//!
//! The trained model consumes a window of [`SEQ_LEN`] consecutive
//! measurements, each flattened into [`FEATURE_COUNT`] features in the exact
//! order of [`FEATURES`]. That order is part of the exported artifact's
//! contract and must match training.

mod scaler;
mod window;

pub use scaler::MinMaxScaler;
pub use window::{FeatureRow, FeatureWindow, feature_row};

use serde::{Deserialize, Serialize};

use crate::id::RoomId;

/// Number of consecutive measurements in a model input window.
pub const SEQ_LEN: usize = 12;

/// Number of features per measurement.
pub const FEATURE_COUNT: usize = 16;

/// Feature names, in model input order.
pub const FEATURES: [&str; FEATURE_COUNT] = [
    "temp",
    "hum",
    "co2",
    "motion",
    "hour",
    "weekday",
    "is_weekend",
    "people_count",
    "room_capacity",
    "occupancy_rate",
    "minutes_to_start",
    "is_occupied",
    "res_duration_min",
    "outdoor_temp",
    "outdoor_hum",
    "wind_speed",
];

/// Prediction horizon, fixed by the training sampling interval.
pub const HORIZON_LABEL: &str = "5 minutes";

/// The pair of scalers exported alongside the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scalers {
    /// Fitted on the [`FEATURES`] columns.
    pub input: MinMaxScaler,
    /// Fitted on the temperature target column.
    pub output: MinMaxScaler,
}

/// Predicted near-future temperature for a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub room_id: RoomId,
    pub predicted_temp: f64,
    pub outdoor_temp: f64,
    pub horizon: String,
}

impl ForecastResult {
    #[must_use]
    pub fn new(room_id: RoomId, predicted_temp: f64, outdoor_temp: f64) -> Self {
        Self {
            room_id,
            predicted_temp,
            outdoor_temp,
            horizon: HORIZON_LABEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_start_with_indoor_readings_and_end_with_weather() {
        assert_eq!(FEATURES[0], "temp");
        assert_eq!(FEATURES[FEATURE_COUNT - 1], "wind_speed");
    }

    #[test]
    fn should_label_result_with_fixed_horizon() {
        let result = ForecastResult::new(RoomId::new(1), 18.2, 9.5);
        assert_eq!(result.horizon, "5 minutes");
    }
}
