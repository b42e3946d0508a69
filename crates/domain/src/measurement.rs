//! Measurements: sensor readings enriched with occupancy and weather context.

use serde::{Deserialize, Serialize};

use crate::id::{MeasurementId, RoomId};
use crate::reservation::Reservation;
use crate::room::Room;
use crate::time::{Timestamp, minutes_between};
use crate::weather::WeatherConditions;

/// Sentinel for `minutes_to_start` when no reservation is upcoming.
pub const NO_UPCOMING_MINUTES: i64 = 999;

/// Raw values produced by a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub temperature: f64,
    pub humidity: f64,
    pub co2: f64,
    pub motion: bool,
}

/// Reservation-derived context at the instant of a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OccupancyContext {
    pub people_count: u32,
    pub room_capacity: u32,
    pub occupancy_rate: f64,
    pub minutes_to_start: i64,
    pub is_occupied: bool,
    pub res_duration_min: i64,
}

impl OccupancyContext {
    /// Derive the context for `room` at `at` from the room's reservations.
    ///
    /// When a reservation is current its head count is used; otherwise the head
    /// count of the nearest upcoming reservation. `minutes_to_start` is
    /// [`NO_UPCOMING_MINUTES`] when nothing starts after `at`.
    #[must_use]
    pub fn derive(room: &Room, reservations: &[Reservation], at: Timestamp) -> Self {
        let mine = reservations.iter().filter(|r| r.room_id == room.id);

        let current = mine.clone().find(|r| r.is_current_at(at));
        let next = mine
            .filter(|r| r.start > at)
            .min_by_key(|r| r.start);

        let minutes_to_start = next.map_or(NO_UPCOMING_MINUTES, |r| minutes_between(at, r.start));
        let people_count = current.or(next).map_or(0, |r| r.people_count);

        Self {
            people_count,
            room_capacity: room.capacity,
            occupancy_rate: occupancy_rate(people_count, room.capacity),
            minutes_to_start,
            is_occupied: current.is_some(),
            res_duration_min: current.map_or(0, Reservation::duration_minutes),
        }
    }
}

/// People divided by capacity, rounded to two decimals.
#[must_use]
pub fn occupancy_rate(people: u32, capacity: u32) -> f64 {
    if capacity == 0 {
        return 0.0;
    }
    (f64::from(people) / f64::from(capacity) * 100.0).round() / 100.0
}

/// An incoming reading before it is enriched and appended to the log.
///
/// Records replayed from generated data may already carry occupancy and
/// weather context; live readings leave them empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMeasurement {
    pub room_id: RoomId,
    pub sensor_id: String,
    pub reading: SensorReading,
    pub recorded_at: Option<Timestamp>,
    pub occupancy: Option<OccupancyContext>,
    pub weather: Option<WeatherConditions>,
}

impl NewMeasurement {
    /// A live reading with no precomputed context.
    #[must_use]
    pub fn live(room_id: RoomId, sensor_id: impl Into<String>, reading: SensorReading) -> Self {
        Self {
            room_id,
            sensor_id: sensor_id.into(),
            reading,
            recorded_at: None,
            occupancy: None,
            weather: None,
        }
    }
}

/// A single stored reading for a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub id: MeasurementId,
    pub room_id: RoomId,
    pub sensor_id: String,
    pub reading: SensorReading,
    pub occupancy: OccupancyContext,
    /// Absent when the reading was logged without weather context.
    pub weather: Option<WeatherConditions>,
    pub recorded_at: Timestamp,
}

impl Measurement {
    /// Create a builder for constructing a [`Measurement`].
    #[must_use]
    pub fn builder() -> MeasurementBuilder {
        MeasurementBuilder::default()
    }
}

/// Step-by-step builder for [`Measurement`].
#[derive(Debug, Default)]
pub struct MeasurementBuilder {
    id: Option<MeasurementId>,
    room_id: Option<RoomId>,
    sensor_id: Option<String>,
    reading: Option<SensorReading>,
    occupancy: Option<OccupancyContext>,
    weather: Option<WeatherConditions>,
    recorded_at: Option<Timestamp>,
}

impl MeasurementBuilder {
    #[must_use]
    pub fn id(mut self, id: MeasurementId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn room_id(mut self, room_id: RoomId) -> Self {
        self.room_id = Some(room_id);
        self
    }

    #[must_use]
    pub fn sensor_id(mut self, sensor_id: impl Into<String>) -> Self {
        self.sensor_id = Some(sensor_id.into());
        self
    }

    #[must_use]
    pub fn reading(mut self, reading: SensorReading) -> Self {
        self.reading = Some(reading);
        self
    }

    #[must_use]
    pub fn occupancy(mut self, occupancy: OccupancyContext) -> Self {
        self.occupancy = Some(occupancy);
        self
    }

    #[must_use]
    pub fn weather(mut self, weather: WeatherConditions) -> Self {
        self.weather = Some(weather);
        self
    }

    #[must_use]
    pub fn recorded_at(mut self, recorded_at: Timestamp) -> Self {
        self.recorded_at = Some(recorded_at);
        self
    }

    /// Consume the builder and return a [`Measurement`].
    #[must_use]
    pub fn build(self) -> Measurement {
        Measurement {
            id: self.id.unwrap_or_default(),
            room_id: self.room_id.unwrap_or(RoomId::new(0)),
            sensor_id: self.sensor_id.unwrap_or_default(),
            reading: self.reading.unwrap_or(SensorReading {
                temperature: 0.0,
                humidity: 0.0,
                co2: 0.0,
                motion: false,
            }),
            occupancy: self.occupancy.unwrap_or(OccupancyContext {
                people_count: 0,
                room_capacity: 0,
                occupancy_rate: 0.0,
                minutes_to_start: NO_UPCOMING_MINUTES,
                is_occupied: false,
                res_duration_min: 0,
            }),
            weather: self.weather,
            recorded_at: self.recorded_at.unwrap_or_else(crate::time::now),
        }
    }
}
