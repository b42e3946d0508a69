//! Sensor poller: periodic reads from a [`SensorSource`] fed into ingestion.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rate_domain::error::RateError;
use rate_domain::id::RoomId;
use rate_domain::measurement::{Measurement, NewMeasurement};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::ports::SensorSource;

/// Destination for live readings. Implemented by the orchestrator.
pub trait MeasurementSink: Send + Sync {
    fn record(
        &self,
        incoming: NewMeasurement,
    ) -> impl Future<Output = Result<Measurement, RateError>> + Send;
}

/// Reads one sensor on a fixed interval and records each reading for a room.
pub struct SensorPoller<S, K> {
    source: S,
    sink: Arc<K>,
    room_id: RoomId,
    sensor_id: String,
    interval: Duration,
}

impl<S, K> SensorPoller<S, K>
where
    S: SensorSource,
    K: MeasurementSink,
{
    pub fn new(
        source: S,
        sink: Arc<K>,
        room_id: RoomId,
        sensor_id: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            sink,
            room_id,
            sensor_id: sensor_id.into(),
            interval,
        }
    }

    /// Take one reading and record it. Failures are logged and skipped.
    pub async fn poll_once(&self) {
        let reading = match self.source.read().await {
            Ok(reading) => reading,
            Err(err) => {
                tracing::warn!(
                    source = self.source.name(),
                    error = %err.0,
                    "sensor read failed"
                );
                return;
            }
        };

        let incoming = NewMeasurement::live(self.room_id, self.sensor_id.clone(), reading);
        match self.sink.record(incoming).await {
            Ok(stored) => tracing::info!(
                room_id = %stored.room_id,
                temperature = stored.reading.temperature,
                humidity = stored.reading.humidity,
                co2 = stored.reading.co2,
                "sensor reading recorded"
            ),
            Err(err) => tracing::error!(
                room_id = %self.room_id,
                error = %err,
                "failed to record reading"
            ),
        }
    }

    /// Poll until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            source = self.source.name(),
            room_id = %self.room_id,
            interval_secs = self.interval.as_secs(),
            "sensor poller started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.poll_once().await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!(source = self.source.name(), "sensor poller stopped");
    }
}
