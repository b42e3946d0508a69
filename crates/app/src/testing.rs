//! In-memory port fakes shared by the service tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{TimeZone, Utc};
use rate_domain::error::{ForecastError, RateError, WeatherUnavailable};
use rate_domain::forecast::FeatureRow;
use rate_domain::id::{ReservationId, RoomId};
use rate_domain::measurement::Measurement;
use rate_domain::reservation::Reservation;
use rate_domain::room::Room;
use rate_domain::time::Timestamp;
use rate_domain::weather::WeatherConditions;

use crate::ports::{
    ForecastModel, MeasurementLog, ReservationFilter, ReservationRepository, RoomRepository,
    WeatherProvider,
};

pub fn at(hour: u32, minute: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
}

pub fn room(id: u32, capacity: u32) -> Room {
    Room::builder()
        .id(RoomId::new(id))
        .name(format!("Room {id}"))
        .capacity(capacity)
        .build()
        .unwrap()
}

pub fn booking(room: u32, start: Timestamp, end: Timestamp, people: u32) -> Reservation {
    Reservation::builder()
        .room_id(RoomId::new(room))
        .user_name("Mme Dupont")
        .title("TP Python")
        .start(start)
        .end(end)
        .people_count(people)
        .build()
        .unwrap()
}

#[derive(Default)]
pub struct InMemoryRooms {
    store: Mutex<HashMap<RoomId, Room>>,
}

impl InMemoryRooms {
    pub fn with(rooms: impl IntoIterator<Item = Room>) -> Self {
        Self {
            store: Mutex::new(rooms.into_iter().map(|r| (r.id, r)).collect()),
        }
    }
}

impl RoomRepository for InMemoryRooms {
    fn upsert(&self, room: Room) -> impl Future<Output = Result<Room, RateError>> + Send {
        self.store.lock().unwrap().insert(room.id, room.clone());
        async { Ok(room) }
    }

    fn get_by_id(
        &self,
        id: RoomId,
    ) -> impl Future<Output = Result<Option<Room>, RateError>> + Send {
        let result = self.store.lock().unwrap().get(&id).cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Room>, RateError>> + Send {
        let mut result: Vec<Room> = self.store.lock().unwrap().values().cloned().collect();
        result.sort_by_key(|r| r.id);
        async { Ok(result) }
    }
}

#[derive(Default)]
pub struct InMemoryReservations {
    store: Mutex<Vec<Reservation>>,
}

impl InMemoryReservations {
    fn select(&self, predicate: impl Fn(&Reservation) -> bool) -> Vec<Reservation> {
        let mut result: Vec<Reservation> = self
            .store
            .lock()
            .unwrap()
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect();
        result.sort_by_key(|r| r.start);
        result
    }
}

impl ReservationRepository for InMemoryReservations {
    fn create(
        &self,
        reservation: Reservation,
    ) -> impl Future<Output = Result<Reservation, RateError>> + Send {
        async move {
            tokio::task::yield_now().await;
            self.store.lock().unwrap().push(reservation.clone());
            Ok(reservation)
        }
    }

    fn get_by_id(
        &self,
        id: ReservationId,
    ) -> impl Future<Output = Result<Option<Reservation>, RateError>> + Send {
        let result = self.select(|r| r.id == id).into_iter().next();
        async { Ok(result) }
    }

    fn list(
        &self,
        filter: ReservationFilter,
    ) -> impl Future<Output = Result<Vec<Reservation>, RateError>> + Send {
        let result = self.select(|r| {
            filter.room_id.is_none_or(|id| r.room_id == id)
                && filter.from.is_none_or(|from| r.end > from)
                && filter.to.is_none_or(|to| r.start < to)
        });
        async { Ok(result) }
    }

    fn find_overlapping(
        &self,
        room_id: RoomId,
        start: Timestamp,
        end: Timestamp,
    ) -> impl Future<Output = Result<Vec<Reservation>, RateError>> + Send {
        // Yields after the read so a concurrent writer can slip in before the caller inserts.
        async move {
            let result = self.select(|r| r.room_id == room_id && r.overlaps(start, end));
            tokio::task::yield_now().await;
            Ok(result)
        }
    }

    fn find_current(
        &self,
        room_id: RoomId,
        at: Timestamp,
    ) -> impl Future<Output = Result<Option<Reservation>, RateError>> + Send {
        let result = self
            .select(|r| r.room_id == room_id && r.is_current_at(at))
            .into_iter()
            .next();
        async { Ok(result) }
    }

    fn find_next(
        &self,
        room_id: RoomId,
        after: Timestamp,
        until: Option<Timestamp>,
    ) -> impl Future<Output = Result<Option<Reservation>, RateError>> + Send {
        let result = self
            .select(|r| {
                r.room_id == room_id && r.start > after && until.is_none_or(|u| r.start <= u)
            })
            .into_iter()
            .next();
        async { Ok(result) }
    }

    fn delete(&self, id: ReservationId) -> impl Future<Output = Result<(), RateError>> + Send {
        self.store.lock().unwrap().retain(|r| r.id != id);
        async { Ok(()) }
    }
}

#[derive(Default)]
pub struct InMemoryMeasurements {
    store: Mutex<Vec<Measurement>>,
}

impl InMemoryMeasurements {
    pub fn len(&self) -> usize {
        self.store.lock().unwrap().len()
    }

    fn newest_first(&self, predicate: impl Fn(&Measurement) -> bool) -> Vec<Measurement> {
        let store = self.store.lock().unwrap();
        let mut result: Vec<Measurement> = store.iter().filter(|m| predicate(m)).cloned().collect();
        // Ties resolve to the most recently appended entry.
        result.reverse();
        result.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        result
    }
}

impl MeasurementLog for InMemoryMeasurements {
    fn append(
        &self,
        measurement: Measurement,
    ) -> impl Future<Output = Result<Measurement, RateError>> + Send {
        self.store.lock().unwrap().push(measurement.clone());
        async { Ok(measurement) }
    }

    fn latest_for_room(
        &self,
        room_id: RoomId,
    ) -> impl Future<Output = Result<Option<Measurement>, RateError>> + Send {
        let result = self.newest_first(|m| m.room_id == room_id).into_iter().next();
        async { Ok(result) }
    }

    fn recent_for_room(
        &self,
        room_id: RoomId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Measurement>, RateError>> + Send {
        let mut result = self.newest_first(|m| m.room_id == room_id);
        result.truncate(limit);
        async { Ok(result) }
    }

    fn last(&self) -> impl Future<Output = Result<Option<Measurement>, RateError>> + Send {
        let result = self.newest_first(|_| true).into_iter().next();
        async { Ok(result) }
    }

    fn list_recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Measurement>, RateError>> + Send {
        let mut result = self.newest_first(|_| true);
        result.truncate(limit);
        async { Ok(result) }
    }
}

/// Weather provider returning fixed conditions, or failing on demand.
pub struct FakeWeather {
    conditions: Option<WeatherConditions>,
    calls: AtomicUsize,
}

impl FakeWeather {
    pub fn returning(conditions: WeatherConditions) -> Self {
        Self {
            conditions: Some(conditions),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            conditions: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl WeatherProvider for FakeWeather {
    fn fetch_current(
        &self,
    ) -> impl Future<Output = Result<WeatherConditions, WeatherUnavailable>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = self
            .conditions
            .ok_or_else(|| WeatherUnavailable("upstream down".into()));
        async move { result }
    }
}

/// Model echoing the normalized temperature of the newest row.
pub struct EchoModel;

impl ForecastModel for EchoModel {
    fn predict(&self, window: &[FeatureRow]) -> Result<f64, ForecastError> {
        window
            .last()
            .map(|row| row[0])
            .ok_or(ForecastError::ShapeMismatch {
                expected: rate_domain::forecast::SEQ_LEN,
                actual: 0,
            })
    }
}
