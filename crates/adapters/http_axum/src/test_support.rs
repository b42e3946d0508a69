//! In-memory ports and state builders for router tests.

use std::sync::{Arc, Mutex};

use rate_app::orchestrator::{HeatingSettings, Orchestrator};
use rate_app::ports::{
    ForecastModel, MeasurementLog, ReservationFilter, ReservationRepository, RoomRepository,
    WeatherProvider,
};
use rate_app::services::{
    ForecastService, MeasurementService, ReservationService, RoomService, WeatherService,
};
use rate_domain::error::{ForecastError, RateError, WeatherUnavailable};
use rate_domain::forecast::FeatureRow;
use rate_domain::id::{ReservationId, RoomId};
use rate_domain::measurement::Measurement;
use rate_domain::reservation::Reservation;
use rate_domain::room::Room;
use rate_domain::time::Timestamp;
use rate_domain::weather::WeatherConditions;

use crate::state::AppState;

#[derive(Clone, Default)]
pub struct StubRooms(Arc<Mutex<Vec<Room>>>);

impl RoomRepository for StubRooms {
    async fn upsert(&self, room: Room) -> Result<Room, RateError> {
        let mut rooms = self.0.lock().unwrap();
        rooms.retain(|r| r.id != room.id);
        rooms.push(room.clone());
        Ok(room)
    }

    async fn get_by_id(&self, id: RoomId) -> Result<Option<Room>, RateError> {
        Ok(self.0.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Room>, RateError> {
        let mut rooms = self.0.lock().unwrap().clone();
        rooms.sort_by_key(|r| r.id);
        Ok(rooms)
    }
}

#[derive(Default)]
pub struct StubReservations(Mutex<Vec<Reservation>>);

impl StubReservations {
    fn select(&self, predicate: impl Fn(&Reservation) -> bool) -> Vec<Reservation> {
        let mut found: Vec<_> = self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect();
        found.sort_by_key(|r| r.start);
        found
    }
}

impl ReservationRepository for StubReservations {
    async fn create(&self, reservation: Reservation) -> Result<Reservation, RateError> {
        self.0.lock().unwrap().push(reservation.clone());
        Ok(reservation)
    }

    async fn get_by_id(&self, id: ReservationId) -> Result<Option<Reservation>, RateError> {
        Ok(self.select(|r| r.id == id).into_iter().next())
    }

    async fn list(&self, filter: ReservationFilter) -> Result<Vec<Reservation>, RateError> {
        Ok(self.select(|r| {
            filter.room_id.is_none_or(|id| r.room_id == id)
                && filter.from.is_none_or(|from| r.end > from)
                && filter.to.is_none_or(|to| r.start < to)
        }))
    }

    async fn find_overlapping(
        &self,
        room_id: RoomId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Reservation>, RateError> {
        Ok(self.select(|r| r.room_id == room_id && r.overlaps(start, end)))
    }

    async fn find_current(
        &self,
        room_id: RoomId,
        at: Timestamp,
    ) -> Result<Option<Reservation>, RateError> {
        Ok(self
            .select(|r| r.room_id == room_id && r.is_current_at(at))
            .into_iter()
            .next())
    }

    async fn find_next(
        &self,
        room_id: RoomId,
        after: Timestamp,
        until: Option<Timestamp>,
    ) -> Result<Option<Reservation>, RateError> {
        Ok(self
            .select(|r| {
                r.room_id == room_id && r.start > after && until.is_none_or(|u| r.start <= u)
            })
            .into_iter()
            .next())
    }

    async fn delete(&self, id: ReservationId) -> Result<(), RateError> {
        self.0.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }
}

#[derive(Default)]
pub struct StubMeasurements(Mutex<Vec<Measurement>>);

impl StubMeasurements {
    fn newest_first(&self, room_id: Option<RoomId>, limit: usize) -> Vec<Measurement> {
        let mut found: Vec<_> = self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|m| room_id.is_none_or(|id| m.room_id == id))
            .cloned()
            .collect();
        found.reverse();
        found.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        found.truncate(limit);
        found
    }
}

impl MeasurementLog for StubMeasurements {
    async fn append(&self, measurement: Measurement) -> Result<Measurement, RateError> {
        self.0.lock().unwrap().push(measurement.clone());
        Ok(measurement)
    }

    async fn latest_for_room(&self, room_id: RoomId) -> Result<Option<Measurement>, RateError> {
        Ok(self.newest_first(Some(room_id), 1).into_iter().next())
    }

    async fn recent_for_room(
        &self,
        room_id: RoomId,
        limit: usize,
    ) -> Result<Vec<Measurement>, RateError> {
        Ok(self.newest_first(Some(room_id), limit))
    }

    async fn last(&self) -> Result<Option<Measurement>, RateError> {
        Ok(self.newest_first(None, 1).into_iter().next())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Measurement>, RateError> {
        Ok(self.newest_first(None, limit))
    }
}

pub struct OfflineWeather;

impl WeatherProvider for OfflineWeather {
    async fn fetch_current(&self) -> Result<WeatherConditions, WeatherUnavailable> {
        Err(WeatherUnavailable("offline".into()))
    }
}

/// Never loaded; forecasts answer 503.
pub struct NoModel;

impl ForecastModel for NoModel {
    fn predict(&self, _window: &[FeatureRow]) -> Result<f64, ForecastError> {
        Err(ForecastError::ModelUnavailable)
    }
}

pub type TestState =
    AppState<StubRooms, StubReservations, StubMeasurements, OfflineWeather, NoModel>;

pub fn room(id: u32, name: &str, capacity: u32) -> Room {
    Room::builder()
        .id(RoomId::new(id))
        .name(name)
        .capacity(capacity)
        .floor("1")
        .build()
        .unwrap()
}

/// State with rooms 1 (`A101`, 30 seats) and 2 (`A102`, 20 seats).
pub fn test_state() -> TestState {
    let rooms = StubRooms(Arc::new(Mutex::new(vec![
        room(1, "A101", 30),
        room(2, "A102", 20),
    ])));
    AppState::new(Orchestrator::new(
        RoomService::new(rooms.clone()),
        ReservationService::new(StubReservations::default(), rooms),
        MeasurementService::new(StubMeasurements::default()),
        WeatherService::new(OfflineWeather),
        ForecastService::unavailable(),
        HeatingSettings::default(),
    ))
}
