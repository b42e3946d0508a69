//! Weather port: source of current outdoor conditions.

use std::future::Future;

use rate_domain::error::WeatherUnavailable;
use rate_domain::weather::WeatherConditions;

/// Fetches the current outdoor conditions from an external provider.
///
/// Callers go through `WeatherService`, which caches results and substitutes
/// defaults on failure.
pub trait WeatherProvider {
    fn fetch_current(
        &self,
    ) -> impl Future<Output = Result<WeatherConditions, WeatherUnavailable>> + Send;
}
