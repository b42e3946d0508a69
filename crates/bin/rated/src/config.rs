//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `rate.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use rate_adapter_weather::OpenMeteoConfig;
use rate_app::orchestrator::HeatingSettings;
use rate_domain::error::RateError;
use rate_domain::heating::HeatingPolicy;
use rate_domain::id::RoomId;
use rate_domain::room::Room;

/// Upper bound for durations read from configuration: one week.
const MAX_HORIZON_MIN: i64 = 7 * 24 * 60;
const MAX_FRESHNESS_SECS: i64 = 7 * 24 * 60 * 60;

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Decision-table constants.
    pub heating: HeatingConfig,
    /// Forecast artifact location.
    pub forecast: ForecastConfig,
    /// Open-Meteo settings.
    pub weather: WeatherConfig,
    /// Local sensor polling.
    pub sensor: SensorConfig,
    /// Rooms upserted at startup.
    pub rooms: Vec<RoomConfig>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HeatingConfig {
    #[serde(flatten)]
    pub policy: HeatingPolicy,
    /// How far ahead a reservation counts as upcoming.
    pub horizon_min: i64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub model_path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Cache lifetime of a fetched snapshot.
    pub freshness_secs: i64,
}

/// Which [`SensorSource`](rate_app::ports::SensorSource) the daemon polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorMode {
    Simulated,
    Hardware,
    Disabled,
}

impl FromStr for SensorMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simulated" => Ok(Self::Simulated),
            "hardware" => Ok(Self::Hardware),
            "disabled" => Ok(Self::Disabled),
            other => Err(ConfigError::Validation(format!(
                "unknown sensor mode {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub mode: SensorMode,
    pub room_id: u32,
    pub sensor_id: String,
    pub interval_secs: u64,
    /// IIO device directory of the SCD4x.
    pub iio_device_dir: PathBuf,
    /// Exported GPIO `value` file wired to the PIR.
    pub motion_gpio_value: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoomConfig {
    pub id: u32,
    pub name: String,
    pub capacity: u32,
    #[serde(default)]
    pub floor: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sensor_id: Option<String>,
}

impl RoomConfig {
    fn seed(id: u32, name: &str, capacity: u32, floor: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            capacity,
            floor: floor.to_string(),
            description: None,
            sensor_id: None,
        }
    }

    /// Validate into a domain [`Room`].
    ///
    /// # Errors
    ///
    /// Returns [`RateError::Validation`] for an empty name or zero capacity.
    pub fn to_room(&self) -> Result<Room, RateError> {
        let mut builder = Room::builder()
            .id(RoomId::new(self.id))
            .name(self.name.clone())
            .capacity(self.capacity)
            .floor(self.floor.clone());
        if let Some(description) = &self.description {
            builder = builder.description(description.clone());
        }
        if let Some(sensor_id) = &self.sensor_id {
            builder = builder.sensor_id(sensor_id.clone());
        }
        builder.build()
    }
}

impl Config {
    /// Load configuration from `rate.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("rate.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(
        &mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = var("RATE_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("RATE_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("RATE_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = var("RATE_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("RATE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RATE_MODEL_PATH") {
            self.forecast.model_path = PathBuf::from(val);
        }
        if let Some(val) = var("RATE_SENSOR_MODE") {
            self.sensor.mode = val.parse()?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Validation(msg.to_string()));
        if self.server.port == 0 {
            return invalid("port must be non-zero");
        }
        if self.heating.policy.deg_per_hour <= 0.0 {
            return invalid("heating.deg_per_hour must be positive");
        }
        if self.heating.policy.temp_tolerance < 0.0 {
            return invalid("heating.temp_tolerance must not be negative");
        }
        if !(0..=MAX_HORIZON_MIN).contains(&self.heating.horizon_min) {
            return invalid("heating.horizon_min must be between 0 and 10080 (7 days)");
        }
        if !(1..=MAX_FRESHNESS_SECS).contains(&self.weather.freshness_secs) {
            return invalid("weather.freshness_secs must be between 1 and 604800 (7 days)");
        }
        if self.sensor.interval_secs == 0 {
            return invalid("sensor.interval_secs must be positive");
        }
        let mut seen = std::collections::HashSet::new();
        for room in &self.rooms {
            if room.capacity == 0 {
                return Err(ConfigError::Validation(format!(
                    "room {} must have a positive capacity",
                    room.id
                )));
            }
            if !seen.insert(room.id) {
                return Err(ConfigError::Validation(format!(
                    "room id {} is declared twice",
                    room.id
                )));
            }
        }
        if self.sensor.mode != SensorMode::Disabled && !seen.contains(&self.sensor.room_id) {
            return Err(ConfigError::Validation(format!(
                "sensor.room_id {} is not a configured room",
                self.sensor.room_id
            )));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    #[must_use]
    pub fn heating_settings(&self) -> HeatingSettings {
        HeatingSettings {
            policy: self.heating.policy,
            horizon: chrono::Duration::minutes(self.heating.horizon_min),
        }
    }

    #[must_use]
    pub fn open_meteo(&self) -> OpenMeteoConfig {
        OpenMeteoConfig {
            base_url: self.weather.base_url.clone(),
            latitude: self.weather.latitude,
            longitude: self.weather.longitude,
            timeout: Duration::from_secs(self.weather.timeout_secs),
        }
    }

    #[must_use]
    pub fn weather_freshness(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.weather.freshness_secs)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.sensor.interval_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:rate.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "rated=info,rate=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for HeatingConfig {
    fn default() -> Self {
        Self {
            policy: HeatingPolicy::default(),
            horizon_min: 60,
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("rate_model.json"),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        let open_meteo = OpenMeteoConfig::default();
        Self {
            latitude: open_meteo.latitude,
            longitude: open_meteo.longitude,
            base_url: open_meteo.base_url,
            timeout_secs: open_meteo.timeout.as_secs(),
            freshness_secs: rate_domain::weather::FRESHNESS_WINDOW_SECS,
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            mode: SensorMode::Simulated,
            room_id: 1,
            sensor_id: "rpi5-room-1".to_string(),
            interval_secs: 10,
            iio_device_dir: PathBuf::from("/sys/bus/iio/devices/iio:device0"),
            motion_gpio_value: PathBuf::from("/sys/class/gpio/gpio14/value"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            heating: HeatingConfig::default(),
            forecast: ForecastConfig::default(),
            weather: WeatherConfig::default(),
            sensor: SensorConfig::default(),
            rooms: default_rooms(),
        }
    }
}

/// Rooms of the demo building; the first one carries the local sensor.
fn default_rooms() -> Vec<RoomConfig> {
    let mut a101 = RoomConfig::seed(1, "A101", 30, "1");
    a101.sensor_id = Some("rpi5-room-1".to_string());
    vec![
        a101,
        RoomConfig::seed(2, "A102", 20, "1"),
        RoomConfig::seed(3, "B201", 15, "2"),
        RoomConfig::seed(4, "Amphi", 100, "0"),
    ]
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
