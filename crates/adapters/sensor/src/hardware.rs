//! SCD4x + PIR sensor read through Linux sysfs.
//!
//! The SCD4x driver exposes its channels under an IIO device directory
//! (`/sys/bus/iio/devices/iio:deviceN`). Each channel has either a processed
//! `<channel>_input` file or a `<channel>_raw` file with optional `_offset`
//! and `_scale` companions, combined as `(raw + offset) * scale`. Temperature
//! and relative humidity come out in milli-units, CO₂ in ppm.
//!
//! The PIR output is read from an exported GPIO `value` file.

use std::path::{Path, PathBuf};

use rate_app::ports::SensorSource;
use rate_domain::error::SensorFailure;
use rate_domain::measurement::SensorReading;

use crate::error::SensorError;

const TEMPERATURE: &str = "in_temp";
const HUMIDITY: &str = "in_humidityrelative";
const CO2: &str = "in_concentration_co2";

#[derive(Debug, Clone)]
enum Channel {
    Processed(PathBuf),
    Raw {
        raw: PathBuf,
        offset: Option<PathBuf>,
        scale: Option<PathBuf>,
    },
}

impl Channel {
    fn locate(dir: &Path, channel: &'static str) -> Result<Self, SensorError> {
        let input = dir.join(format!("{channel}_input"));
        if input.is_file() {
            return Ok(Self::Processed(input));
        }
        let raw = dir.join(format!("{channel}_raw"));
        if !raw.is_file() {
            return Err(SensorError::MissingChannel {
                dir: dir.to_path_buf(),
                channel,
            });
        }
        let companion = |suffix: &str| {
            let path = dir.join(format!("{channel}_{suffix}"));
            path.is_file().then_some(path)
        };
        Ok(Self::Raw {
            raw,
            offset: companion("offset"),
            scale: companion("scale"),
        })
    }

    async fn value(&self) -> Result<f64, SensorError> {
        match self {
            Self::Processed(path) => read_number(path).await,
            Self::Raw { raw, offset, scale } => {
                let raw = read_number(raw).await?;
                let offset = match offset {
                    Some(path) => read_number(path).await?,
                    None => 0.0,
                };
                let scale = match scale {
                    Some(path) => read_number(path).await?,
                    None => 1.0,
                };
                Ok((raw + offset) * scale)
            }
        }
    }
}

async fn read_trimmed(path: &Path) -> Result<String, SensorError> {
    tokio::fs::read_to_string(path)
        .await
        .map(|content| content.trim().to_owned())
        .map_err(|source| SensorError::Io {
            path: path.to_path_buf(),
            source,
        })
}

async fn read_number(path: &Path) -> Result<f64, SensorError> {
    let value = read_trimmed(path).await?;
    value.parse().map_err(|_| SensorError::Parse {
        path: path.to_path_buf(),
        value,
    })
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Physical room sensor.
#[derive(Debug, Clone)]
pub struct HardwareSensor {
    temperature: Channel,
    humidity: Channel,
    co2: Channel,
    motion: PathBuf,
}

impl HardwareSensor {
    /// Locate the IIO channels and the GPIO value file.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::MissingChannel`] when a channel is not exposed
    /// by `iio_device_dir`, or [`SensorError::Io`] when the GPIO value file
    /// cannot be read.
    pub fn open(
        iio_device_dir: impl AsRef<Path>,
        motion_gpio_value: impl Into<PathBuf>,
    ) -> Result<Self, SensorError> {
        let dir = iio_device_dir.as_ref();
        let motion = motion_gpio_value.into();
        std::fs::metadata(&motion).map_err(|source| SensorError::Io {
            path: motion.clone(),
            source,
        })?;
        let sensor = Self {
            temperature: Channel::locate(dir, TEMPERATURE)?,
            humidity: Channel::locate(dir, HUMIDITY)?,
            co2: Channel::locate(dir, CO2)?,
            motion,
        };
        tracing::info!(
            iio = %dir.display(),
            gpio = %sensor.motion.display(),
            "hardware sensor ready"
        );
        Ok(sensor)
    }

    async fn motion(&self) -> Result<bool, SensorError> {
        let value = read_trimmed(&self.motion).await?;
        match value.as_str() {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(SensorError::Parse {
                path: self.motion.clone(),
                value,
            }),
        }
    }

    async fn sample(&self) -> Result<SensorReading, SensorError> {
        let temperature = self.temperature.value().await? / 1000.0;
        let humidity = self.humidity.value().await? / 1000.0;
        let co2 = self.co2.value().await?;
        Ok(SensorReading {
            temperature: round_to(temperature, 2),
            humidity: round_to(humidity, 2),
            co2: round_to(co2, 1),
            motion: self.motion().await?,
        })
    }
}

impl SensorSource for HardwareSensor {
    fn name(&self) -> &str {
        "hardware"
    }

    async fn read(&self) -> Result<SensorReading, SensorFailure> {
        Ok(self.sample().await?)
    }
}
