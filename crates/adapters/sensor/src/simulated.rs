//! Simulated sensor used when no hardware is attached.

use std::future::Future;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{Local, Timelike};
use rate_app::ports::SensorSource;
use rate_domain::error::SensorFailure;
use rate_domain::measurement::SensorReading;

const BASE_TEMPERATURE: f64 = 17.0;
const NIGHT_OFFSET: f64 = -2.0;
const JITTER: f64 = 0.3;

/// Minimal xorshift64 generator; readings only need to look plausible.
#[derive(Debug)]
struct XorShift64(u64);

impl XorShift64 {
    fn new(seed: u64) -> Self {
        // Zero is a fixed point of xorshift.
        Self(if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed })
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform in `[low, high)`.
    #[allow(clippy::cast_precision_loss)]
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        low + unit * (high - low)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Generates classroom-like readings: 17 °C by day, 15 °C at night
/// (before 07:00 and after 20:59), with a small jitter.
#[derive(Debug)]
pub struct SimulatedSensor {
    rng: Mutex<XorShift64>,
}

impl SimulatedSensor {
    /// Deterministic sensor, for tests and reproducible demos.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(XorShift64::new(seed)),
        }
    }

    /// Sensor seeded from the wall clock.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        Self::with_seed(nanos as u64)
    }

    /// One reading as it would be taken at local `hour`.
    pub fn sample(&self, hour: u32) -> SensorReading {
        let base = if hour < 7 || hour > 20 {
            BASE_TEMPERATURE + NIGHT_OFFSET
        } else {
            BASE_TEMPERATURE
        };
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        SensorReading {
            temperature: round_to(base + rng.uniform(-JITTER, JITTER), 2),
            humidity: round_to(rng.uniform(40.0, 65.0), 2),
            co2: round_to(rng.uniform(400.0, 1200.0), 1),
            motion: false,
        }
    }
}

impl SensorSource for SimulatedSensor {
    fn name(&self) -> &str {
        "simulated"
    }

    fn read(&self) -> impl Future<Output = Result<SensorReading, SensorFailure>> + Send {
        let reading = self.sample(Local::now().hour());
        async move { Ok(reading) }
    }
}
