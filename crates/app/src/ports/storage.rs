//! Storage port: repository traits for persistence.

use std::future::Future;

use rate_domain::error::RateError;
use rate_domain::id::{ReservationId, RoomId};
use rate_domain::measurement::Measurement;
use rate_domain::reservation::Reservation;
use rate_domain::room::Room;
use rate_domain::time::Timestamp;

/// Repository for [`Room`] metadata.
pub trait RoomRepository {
    /// Insert a room, or replace the stored one with the same id.
    fn upsert(&self, room: Room) -> impl Future<Output = Result<Room, RateError>> + Send;

    /// Get a room by its identifier.
    fn get_by_id(&self, id: RoomId)
    -> impl Future<Output = Result<Option<Room>, RateError>> + Send;

    /// List all rooms ordered by id.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Room>, RateError>> + Send;
}

/// Optional constraints applied when listing reservations.
///
/// `from`/`to` select reservations whose interval intersects `[from, to)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReservationFilter {
    pub room_id: Option<RoomId>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

/// Repository for [`Reservation`]s and their interval queries.
pub trait ReservationRepository {
    /// Persist a new reservation. Conflict checks happen in the service.
    fn create(
        &self,
        reservation: Reservation,
    ) -> impl Future<Output = Result<Reservation, RateError>> + Send;

    /// Get a reservation by its identifier.
    fn get_by_id(
        &self,
        id: ReservationId,
    ) -> impl Future<Output = Result<Option<Reservation>, RateError>> + Send;

    /// List reservations matching `filter`, ordered by start.
    fn list(
        &self,
        filter: ReservationFilter,
    ) -> impl Future<Output = Result<Vec<Reservation>, RateError>> + Send;

    /// Reservations of `room_id` whose half-open interval intersects `[start, end)`.
    fn find_overlapping(
        &self,
        room_id: RoomId,
        start: Timestamp,
        end: Timestamp,
    ) -> impl Future<Output = Result<Vec<Reservation>, RateError>> + Send;

    /// The reservation of `room_id` with `start <= at <= end`, earliest start first.
    fn find_current(
        &self,
        room_id: RoomId,
        at: Timestamp,
    ) -> impl Future<Output = Result<Option<Reservation>, RateError>> + Send;

    /// The earliest reservation of `room_id` starting strictly after `after`,
    /// and no later than `until` when given.
    fn find_next(
        &self,
        room_id: RoomId,
        after: Timestamp,
        until: Option<Timestamp>,
    ) -> impl Future<Output = Result<Option<Reservation>, RateError>> + Send;

    /// Remove a reservation. Removing an unknown id is not an error.
    fn delete(&self, id: ReservationId) -> impl Future<Output = Result<(), RateError>> + Send;
}

/// Append-only log of per-room [`Measurement`]s.
pub trait MeasurementLog {
    /// Append a measurement.
    fn append(
        &self,
        measurement: Measurement,
    ) -> impl Future<Output = Result<Measurement, RateError>> + Send;

    /// The most recent measurement of a room.
    fn latest_for_room(
        &self,
        room_id: RoomId,
    ) -> impl Future<Output = Result<Option<Measurement>, RateError>> + Send;

    /// Up to `limit` measurements of a room, ordered newest-first.
    fn recent_for_room(
        &self,
        room_id: RoomId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Measurement>, RateError>> + Send;

    /// The most recent measurement of any room.
    fn last(&self) -> impl Future<Output = Result<Option<Measurement>, RateError>> + Send;

    /// Up to `limit` measurements of any room, ordered newest-first.
    fn list_recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Measurement>, RateError>> + Send;
}
