//! # rate-adapter-sensor
//!
//! Implementations of the [`SensorSource`](rate_app::ports::SensorSource) port.
//!
//! | Source | Mode | Behaviour |
//! |--------|------|-----------|
//! | [`SimulatedSensor`] | `simulated` | Plausible classroom readings with a night-time dip |
//! | [`HardwareSensor`] | `hardware` | SCD4x CO₂/temperature/humidity via IIO sysfs, PIR via a GPIO `value` file |
//!
//! ## Dependency rule
//!
//! Depends on `rate-app` (port traits) and `rate-domain` only.

mod error;
mod hardware;
mod simulated;

pub use error::SensorError;
pub use hardware::HardwareSensor;
pub use simulated::SimulatedSensor;
