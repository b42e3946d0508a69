//! Outdoor weather conditions and the cached snapshot wrapper.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Cache lifetime for a weather snapshot, in seconds.
pub const FRESHNESS_WINDOW_SECS: i64 = 600;

/// Outdoor conditions used as forecasting features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherConditions {
    pub outdoor_temp: f64,
    pub outdoor_hum: f64,
    pub wind_speed: f64,
}

impl WeatherConditions {
    /// Fallback used whenever the upstream provider fails.
    pub const DEFAULT: Self = Self {
        outdoor_temp: 10.0,
        outdoor_hum: 60.0,
        wind_speed: 5.0,
    };
}

impl Default for WeatherConditions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Conditions together with the instant they were captured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    #[serde(flatten)]
    pub conditions: WeatherConditions,
    pub captured_at: Timestamp,
}

impl WeatherSnapshot {
    #[must_use]
    pub fn new(conditions: WeatherConditions, captured_at: Timestamp) -> Self {
        Self {
            conditions,
            captured_at,
        }
    }

    /// Whether the snapshot is younger than `window` at `now`.
    #[must_use]
    pub fn is_fresh(&self, now: Timestamp, window: Duration) -> bool {
        now - self.captured_at < window
    }
}
