//! Sensor port: a single reading from a room sensor.

use std::future::Future;

use rate_domain::error::SensorFailure;
use rate_domain::measurement::SensorReading;

/// A physical or simulated source of [`SensorReading`]s.
pub trait SensorSource {
    /// Short name used in logs (`"simulated"`, `"hardware"`).
    fn name(&self) -> &str;

    /// Take one reading.
    fn read(&self) -> impl Future<Output = Result<SensorReading, SensorFailure>> + Send;
}
