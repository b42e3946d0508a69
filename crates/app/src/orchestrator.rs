//! Orchestrator: composes the services into per-room answers.
//!
//! Every query is evaluated on demand from the current store state; nothing
//! here caches decisions or runs on a schedule.

use std::future::Future;

use chrono::Duration;
use rate_domain::error::{ForecastError, RateError};
use rate_domain::forecast::{ForecastResult, SEQ_LEN};
use rate_domain::heating::{self, HeatingPolicy};
use rate_domain::id::RoomId;
use rate_domain::measurement::{Measurement, NewMeasurement, OccupancyContext};
use rate_domain::room::Room;
use rate_domain::room_status::RoomStatus;
use rate_domain::time::{self, Timestamp};

use crate::ports::{
    ForecastModel, MeasurementLog, ReservationRepository, RoomRepository, WeatherProvider,
};
use crate::sensor_poller::MeasurementSink;
use crate::services::{
    ForecastService, MeasurementService, ReservationService, RoomService, WeatherService,
};

/// Decision-table constants plus the look-ahead window for upcoming bookings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatingSettings {
    pub policy: HeatingPolicy,
    pub horizon: Duration,
}

impl Default for HeatingSettings {
    fn default() -> Self {
        Self {
            policy: HeatingPolicy::default(),
            horizon: Duration::minutes(60),
        }
    }
}

/// Composition root of the application layer.
///
/// `M` is the room repository shared by the room and reservation services.
pub struct Orchestrator<M, R, L, W, F> {
    rooms: RoomService<M>,
    reservations: ReservationService<R, M>,
    measurements: MeasurementService<L>,
    weather: WeatherService<W>,
    forecast: ForecastService<F>,
    settings: HeatingSettings,
}

impl<M, R, L, W, F> Orchestrator<M, R, L, W, F>
where
    M: RoomRepository,
    R: ReservationRepository,
    L: MeasurementLog,
    W: WeatherProvider,
    F: ForecastModel,
{
    pub fn new(
        rooms: RoomService<M>,
        reservations: ReservationService<R, M>,
        measurements: MeasurementService<L>,
        weather: WeatherService<W>,
        forecast: ForecastService<F>,
        settings: HeatingSettings,
    ) -> Self {
        Self {
            rooms,
            reservations,
            measurements,
            weather,
            forecast,
            settings,
        }
    }

    pub fn rooms(&self) -> &RoomService<M> {
        &self.rooms
    }

    pub fn reservations(&self) -> &ReservationService<R, M> {
        &self.reservations
    }

    pub fn measurements(&self) -> &MeasurementService<L> {
        &self.measurements
    }

    pub fn weather(&self) -> &WeatherService<W> {
        &self.weather
    }

    pub fn settings(&self) -> &HeatingSettings {
        &self.settings
    }

    /// Status of one room at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`RateError::NotFound`] for an unknown room, or a storage
    /// error from any repository.
    pub async fn room_status(
        &self,
        room_id: RoomId,
        now: Timestamp,
    ) -> Result<RoomStatus, RateError> {
        let room = self.rooms.get_room(room_id).await?;
        self.status_of(room, now).await
    }

    /// Status of every room at `now`, ordered by room id.
    ///
    /// # Errors
    ///
    /// Returns a storage error from any repository.
    pub async fn room_statuses(&self, now: Timestamp) -> Result<Vec<RoomStatus>, RateError> {
        let rooms = self.rooms.list_rooms().await?;
        let mut statuses = Vec::with_capacity(rooms.len());
        for room in rooms {
            statuses.push(self.status_of(room, now).await?);
        }
        Ok(statuses)
    }

    async fn status_of(&self, room: Room, now: Timestamp) -> Result<RoomStatus, RateError> {
        let latest = self.measurements.latest(room.id).await?;
        let current = self.reservations.current_for(room.id, now).await?;
        let upcoming = self
            .reservations
            .upcoming_within(room.id, now, self.settings.horizon)
            .await?;
        let next = self.reservations.next_any(room.id, now).await?;

        let current_temp = latest.as_ref().map(|m| m.reading.temperature);
        let decision = heating::decide(
            &self.settings.policy,
            now,
            current_temp,
            current.as_ref(),
            upcoming.as_ref(),
        );
        tracing::debug!(room_id = %room.id, status = %decision.status, "heating decided");

        Ok(RoomStatus {
            target_temp: self.settings.policy.target_temp,
            current_temp,
            last_measured_at: latest.map(|m| m.recorded_at),
            current_reservation: current,
            upcoming_reservation: upcoming,
            next_reservation: next,
            heating: decision,
            room,
        })
    }

    /// Forecast the near-future temperature of a room.
    ///
    /// # Errors
    ///
    /// - [`RateError::NotFound`] for an unknown room.
    /// - [`RateError::Forecast`] when the model is unavailable or the room
    ///   has too little history.
    pub async fn forecast(
        &self,
        room_id: RoomId,
        now: Timestamp,
    ) -> Result<ForecastResult, RateError> {
        let room = self.rooms.get_room(room_id).await?;
        if !self.forecast.is_available() {
            return Err(ForecastError::ModelUnavailable.into());
        }

        let weather = self.weather.current(now).await;
        let history = self.measurements.recent(room.id, SEQ_LEN).await?;
        let predicted = self.forecast.predict(history, &weather.conditions)?;
        tracing::debug!(room_id = %room.id, predicted, "forecast computed");

        Ok(ForecastResult::new(
            room.id,
            predicted,
            weather.conditions.outdoor_temp,
        ))
    }

    /// Enrich a reading with occupancy and weather context and append it.
    ///
    /// Context already present on `incoming` is kept as-is; the timestamp
    /// defaults to `now`.
    ///
    /// # Errors
    ///
    /// Returns [`RateError::NotFound`] for an unknown room, or a storage
    /// error from any repository.
    pub async fn ingest(
        &self,
        incoming: NewMeasurement,
        now: Timestamp,
    ) -> Result<Measurement, RateError> {
        let room = self.rooms.get_room(incoming.room_id).await?;
        let recorded_at = incoming.recorded_at.unwrap_or(now);

        let occupancy = match incoming.occupancy {
            Some(occupancy) => occupancy,
            None => {
                let nearby: Vec<_> = [
                    self.reservations.current_for(room.id, recorded_at).await?,
                    self.reservations.next_any(room.id, recorded_at).await?,
                ]
                .into_iter()
                .flatten()
                .collect();
                OccupancyContext::derive(&room, &nearby, recorded_at)
            }
        };

        let weather = match incoming.weather {
            Some(weather) => weather,
            None => self.weather.current(now).await.conditions,
        };

        let measurement = Measurement::builder()
            .room_id(room.id)
            .sensor_id(incoming.sensor_id)
            .reading(incoming.reading)
            .occupancy(occupancy)
            .weather(weather)
            .recorded_at(recorded_at)
            .build();

        let stored = self.measurements.log().append(measurement).await?;
        tracing::debug!(
            room_id = %stored.room_id,
            temperature = stored.reading.temperature,
            "measurement recorded"
        );
        Ok(stored)
    }
}

impl<M, R, L, W, F> MeasurementSink for Orchestrator<M, R, L, W, F>
where
    M: RoomRepository + Send + Sync,
    R: ReservationRepository + Send + Sync,
    L: MeasurementLog + Send + Sync,
    W: WeatherProvider + Send + Sync,
    F: ForecastModel,
{
    fn record(
        &self,
        incoming: NewMeasurement,
    ) -> impl Future<Output = Result<Measurement, RateError>> + Send {
        self.ingest(incoming, time::now())
    }
}
