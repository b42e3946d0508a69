//! Weather service: cached outdoor conditions with a default fallback.

use chrono::Duration;
use rate_domain::time::Timestamp;
use rate_domain::weather::{FRESHNESS_WINDOW_SECS, WeatherConditions, WeatherSnapshot};
use tokio::sync::Mutex;

use crate::ports::WeatherProvider;

/// Serves the current weather, refreshing the cached snapshot once it is
/// older than the freshness window.
///
/// Upstream failures never reach callers: the default conditions are cached
/// and returned instead, so a failing provider is retried at most once per
/// window. The cache lock is held during a refresh, which coalesces
/// concurrent refreshes into one upstream call.
pub struct WeatherService<W> {
    provider: W,
    freshness: Duration,
    cache: Mutex<Option<WeatherSnapshot>>,
}

impl<W: WeatherProvider> WeatherService<W> {
    /// Create a service with the default freshness window.
    pub fn new(provider: W) -> Self {
        Self::with_freshness(provider, Duration::seconds(FRESHNESS_WINDOW_SECS))
    }

    /// Create a service with a custom freshness window.
    pub fn with_freshness(provider: W, freshness: Duration) -> Self {
        Self {
            provider,
            freshness,
            cache: Mutex::new(None),
        }
    }

    /// Current snapshot at `now`, fetched from the provider when stale.
    pub async fn current(&self, now: Timestamp) -> WeatherSnapshot {
        let mut cache = self.cache.lock().await;
        if let Some(snapshot) = cache.filter(|s| s.is_fresh(now, self.freshness)) {
            return snapshot;
        }

        let conditions = match self.provider.fetch_current().await {
            Ok(conditions) => {
                tracing::debug!(
                    outdoor_temp = conditions.outdoor_temp,
                    outdoor_hum = conditions.outdoor_hum,
                    wind_speed = conditions.wind_speed,
                    "weather refreshed"
                );
                conditions
            }
            Err(err) => {
                tracing::warn!(error = %err.0, "weather unavailable, using defaults");
                WeatherConditions::DEFAULT
            }
        };

        let snapshot = WeatherSnapshot::new(conditions, now);
        *cache = Some(snapshot);
        snapshot
    }
}
