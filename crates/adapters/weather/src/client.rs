use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use rate_app::ports::WeatherProvider;
use rate_domain::error::WeatherUnavailable;
use rate_domain::weather::WeatherConditions;

const CURRENT_VARIABLES: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m";

/// Location and endpoint settings.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenMeteoConfig {
    pub base_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timeout: Duration,
}

impl Default for OpenMeteoConfig {
    /// Paris, on the public endpoint.
    fn default() -> Self {
        Self {
            base_url: "https://api.open-meteo.com/v1/forecast".to_owned(),
            latitude: 48.8566,
            longitude: 2.3522,
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WeatherClientError {
    #[error("weather request failed")]
    Http(#[from] reqwest::Error),

    #[error("unexpected weather response")]
    Decode(#[from] serde_json::Error),
}

impl From<WeatherClientError> for WeatherUnavailable {
    fn from(err: WeatherClientError) -> Self {
        WeatherUnavailable(Box::new(err))
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    wind_speed_10m: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn parse_current(body: &[u8]) -> Result<WeatherConditions, WeatherClientError> {
    let response: ForecastResponse = serde_json::from_slice(body)?;
    Ok(WeatherConditions {
        outdoor_temp: round2(response.current.temperature_2m),
        outdoor_hum: round2(response.current.relative_humidity_2m),
        wind_speed: round2(response.current.wind_speed_10m),
    })
}

/// HTTP client for the Open-Meteo `current` conditions.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: Client,
    url: String,
}

impl OpenMeteoClient {
    /// Build a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherClientError::Http`] if the TLS backend cannot be
    /// initialised.
    pub fn new(config: &OpenMeteoConfig) -> Result<Self, WeatherClientError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        let url = format!(
            "{}?latitude={}&longitude={}&current={CURRENT_VARIABLES}&forecast_days=1",
            config.base_url, config.latitude, config.longitude
        );
        Ok(Self { http, url })
    }

    async fn fetch(&self) -> Result<WeatherConditions, WeatherClientError> {
        tracing::debug!(url = %self.url, "requesting current weather");
        let bytes = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        parse_current(&bytes)
    }
}

impl WeatherProvider for OpenMeteoClient {
    async fn fetch_current(&self) -> Result<WeatherConditions, WeatherUnavailable> {
        self.fetch().await.map_err(|err| {
            tracing::debug!(url = %self.url, error = %err, "weather request failed");
            WeatherUnavailable::from(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "latitude": 48.86,
        "longitude": 2.3399997,
        "generationtime_ms": 0.03,
        "utc_offset_seconds": 0,
        "timezone": "GMT",
        "current_units": {
            "time": "iso8601",
            "interval": "seconds",
            "temperature_2m": "°C",
            "relative_humidity_2m": "%",
            "wind_speed_10m": "km/h"
        },
        "current": {
            "time": "2026-03-02T08:00",
            "interval": 900,
            "temperature_2m": 7.346,
            "relative_humidity_2m": 81,
            "wind_speed_10m": 12.96
        }
    }"#;

    #[test]
    fn should_extract_current_block_rounded() {
        let conditions = parse_current(SAMPLE.as_bytes()).unwrap();

        assert!((conditions.outdoor_temp - 7.35).abs() < 1e-9);
        assert!((conditions.outdoor_hum - 81.0).abs() < f64::EPSILON);
        assert!((conditions.wind_speed - 12.96).abs() < 1e-9);
    }

    #[test]
    fn should_reject_response_without_current_block() {
        let err = parse_current(br#"{"error": true, "reason": "Latitude must be in range"}"#)
            .unwrap_err();

        assert!(matches!(err, WeatherClientError::Decode(_)));
    }

    #[test]
    fn should_build_request_url_from_config() {
        let client = OpenMeteoClient::new(&OpenMeteoConfig::default()).unwrap();

        assert_eq!(
            client.url,
            "https://api.open-meteo.com/v1/forecast?latitude=48.8566&longitude=2.3522\
             &current=temperature_2m,relative_humidity_2m,wind_speed_10m&forecast_days=1"
        );
    }

    #[tokio::test]
    async fn should_report_unreachable_endpoint_as_unavailable() {
        let client = OpenMeteoClient::new(&OpenMeteoConfig {
            base_url: "http://127.0.0.1:9/v1/forecast".to_owned(),
            timeout: Duration::from_secs(2),
            ..OpenMeteoConfig::default()
        })
        .unwrap();

        assert!(client.fetch_current().await.is_err());
    }
}
