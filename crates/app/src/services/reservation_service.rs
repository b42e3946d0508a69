//! Reservation service: conflict-checked booking and interval queries.
//!
//! Creation is a check-then-insert sequence, so it is serialized per room:
//! two concurrent requests for the same empty slot cannot both pass the
//! overlap check. Requests for different rooms never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Days, Duration, NaiveDate, NaiveTime};
use rate_domain::error::{ConflictError, NotFoundError, RateError};
use rate_domain::id::{ReservationId, RoomId};
use rate_domain::reservation::Reservation;
use rate_domain::time::Timestamp;

use crate::ports::{ReservationFilter, ReservationRepository, RoomRepository};

/// Application service owning the reservation invariants.
pub struct ReservationService<R, M> {
    repo: R,
    rooms: M,
    locks: Mutex<HashMap<RoomId, Arc<tokio::sync::Mutex<()>>>>,
}

impl<R, M> ReservationService<R, M>
where
    R: ReservationRepository,
    M: RoomRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(repo: R, rooms: M) -> Self {
        Self {
            repo,
            rooms,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn room_lock(&self, room_id: RoomId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(room_id).or_default())
    }

    /// Book a room.
    ///
    /// # Errors
    ///
    /// - [`RateError::Validation`] if the reservation is malformed.
    /// - [`RateError::NotFound`] if the room does not exist.
    /// - [`RateError::Conflict`] if it overlaps an existing booking of the
    ///   same room; nothing is stored in that case.
    pub async fn create(&self, reservation: Reservation) -> Result<Reservation, RateError> {
        reservation.validate()?;
        let room_id = reservation.room_id;
        if self.rooms.get_by_id(room_id).await?.is_none() {
            return Err(NotFoundError {
                entity: "Room",
                id: room_id.to_string(),
            }
            .into());
        }

        let lock = self.room_lock(room_id);
        let _guard = lock.lock().await;

        let overlapping = self
            .repo
            .find_overlapping(room_id, reservation.start, reservation.end)
            .await?;
        if let Some(existing) = overlapping.first() {
            tracing::info!(
                room_id = %room_id,
                existing = %existing.id,
                start = %reservation.start,
                end = %reservation.end,
                "reservation rejected, slot already booked"
            );
            return Err(ConflictError {
                room_id,
                existing: existing.id,
            }
            .into());
        }

        let created = self.repo.create(reservation).await?;
        tracing::info!(room_id = %room_id, reservation_id = %created.id, "reservation created");
        Ok(created)
    }

    /// Look up a reservation by id.
    ///
    /// # Errors
    ///
    /// Returns [`RateError::NotFound`] when no reservation with `id` exists,
    /// or a storage error from the repository.
    pub async fn get(&self, id: ReservationId) -> Result<Reservation, RateError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Reservation",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List reservations, optionally restricted to a room and to those
    /// overlapping a UTC calendar day.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list(
        &self,
        room_id: Option<RoomId>,
        day: Option<NaiveDate>,
    ) -> Result<Vec<Reservation>, RateError> {
        let mut filter = ReservationFilter {
            room_id,
            ..ReservationFilter::default()
        };
        if let Some(day) = day {
            let from = day.and_time(NaiveTime::MIN).and_utc();
            filter.from = Some(from);
            filter.to = from.checked_add_days(Days::new(1));
        }
        self.repo.list(filter).await
    }

    /// The reservation running at `at` (closed interval, `start <= at <= end`).
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn current_for(
        &self,
        room_id: RoomId,
        at: Timestamp,
    ) -> Result<Option<Reservation>, RateError> {
        self.repo.find_current(room_id, at).await
    }

    /// The earliest reservation starting after `at` and no later than
    /// `at + horizon`.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn upcoming_within(
        &self,
        room_id: RoomId,
        at: Timestamp,
        horizon: Duration,
    ) -> Result<Option<Reservation>, RateError> {
        self.repo.find_next(room_id, at, Some(at + horizon)).await
    }

    /// The earliest reservation starting after `at`, regardless of horizon.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn next_any(
        &self,
        room_id: RoomId,
        at: Timestamp,
    ) -> Result<Option<Reservation>, RateError> {
        self.repo.find_next(room_id, at, None).await
    }

    /// Remove a reservation. Deleting an unknown id succeeds.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn delete(&self, id: ReservationId) -> Result<(), RateError> {
        self.repo.delete(id).await?;
        tracing::info!(reservation_id = %id, "reservation deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rate_domain::error::ValidationError;

    use super::*;
    use crate::testing::{InMemoryReservations, InMemoryRooms, at, booking, room};

    type Service = ReservationService<InMemoryReservations, InMemoryRooms>;

    fn make_service() -> Service {
        ReservationService::new(
            InMemoryReservations::default(),
            InMemoryRooms::with([room(1, 30), room(2, 20)]),
        )
    }

    #[tokio::test]
    async fn should_reject_overlap_and_accept_touching_boundary() {
        let svc = make_service();

        svc.create(booking(1, at(8, 0), at(10, 0), 20)).await.unwrap();

        let inside = svc.create(booking(1, at(9, 0), at(9, 30), 5)).await;
        assert!(matches!(inside, Err(RateError::Conflict(_))));

        svc.create(booking(1, at(10, 0), at(11, 0), 10)).await.unwrap();

        let all = svc.list(Some(RoomId::new(1)), None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn should_report_existing_reservation_when_conflicting() {
        let svc = make_service();
        let first = svc.create(booking(1, at(8, 0), at(10, 0), 20)).await.unwrap();

        let err = svc
            .create(booking(1, at(7, 0), at(8, 30), 5))
            .await
            .unwrap_err();
        match err {
            RateError::Conflict(conflict) => {
                assert_eq!(conflict.existing, first.id);
                assert_eq!(conflict.room_id, RoomId::new(1));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn should_allow_same_slot_in_different_rooms() {
        let svc = make_service();
        svc.create(booking(1, at(8, 0), at(10, 0), 20)).await.unwrap();
        svc.create(booking(2, at(8, 0), at(10, 0), 15)).await.unwrap();
    }

    #[tokio::test]
    async fn should_return_not_found_when_room_is_unknown() {
        let svc = make_service();
        let result = svc.create(booking(9, at(8, 0), at(10, 0), 1)).await;
        assert!(matches!(result, Err(RateError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_reject_empty_title() {
        let svc = make_service();
        let mut reservation = booking(1, at(8, 0), at(10, 0), 1);
        reservation.title = "  ".to_string();

        let result = svc.create(reservation).await;
        assert!(matches!(
            result,
            Err(RateError::Validation(ValidationError::EmptyTitle))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn should_keep_only_one_of_concurrent_bookings_for_same_slot() {
        let svc = Arc::new(make_service());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let svc = Arc::clone(&svc);
                tokio::spawn(async move {
                    svc.create(booking(1, at(8, 0), at(9, i), 3)).await
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn should_never_store_overlapping_bookings_in_one_room() {
        let svc = Arc::new(make_service());
        let slots = [
            (at(8, 0), at(10, 0)),
            (at(9, 0), at(11, 0)),
            (at(8, 30), at(9, 30)),
            (at(10, 0), at(12, 0)),
            (at(7, 0), at(8, 0)),
            (at(7, 30), at(12, 30)),
            (at(11, 59), at(12, 1)),
            (at(12, 0), at(13, 0)),
        ];

        let handles: Vec<_> = (0..4)
            .flat_map(|_| [1, 2])
            .flat_map(|room_id| slots.iter().map(move |&(start, end)| (room_id, start, end)))
            .map(|(room_id, start, end)| {
                let svc = Arc::clone(&svc);
                tokio::spawn(async move { svc.create(booking(room_id, start, end, 3)).await })
            })
            .collect();
        for handle in handles {
            let _ = handle.await.unwrap();
        }

        for room_id in [1, 2] {
            let stored = svc.list(Some(RoomId::new(room_id)), None).await.unwrap();
            assert!(!stored.is_empty());
            for (i, a) in stored.iter().enumerate() {
                for b in &stored[i + 1..] {
                    assert!(
                        !a.overlaps(b.start, b.end),
                        "{a:?} overlaps {b:?} in room {room_id}"
                    );
                }
            }
        }
    }

    #[tokio::test]
    async fn should_treat_end_instant_as_current() {
        let svc = make_service();
        svc.create(booking(1, at(8, 0), at(10, 0), 20)).await.unwrap();

        let room = RoomId::new(1);
        assert!(svc.current_for(room, at(8, 0)).await.unwrap().is_some());
        assert!(svc.current_for(room, at(10, 0)).await.unwrap().is_some());
        assert!(svc.current_for(room, at(10, 1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_find_upcoming_only_within_horizon() {
        let svc = make_service();
        svc.create(booking(1, at(11, 0), at(12, 0), 20)).await.unwrap();
        let room = RoomId::new(1);

        let within = svc
            .upcoming_within(room, at(10, 0), Duration::minutes(60))
            .await
            .unwrap();
        assert!(within.is_some());

        let outside = svc
            .upcoming_within(room, at(9, 59), Duration::minutes(60))
            .await
            .unwrap();
        assert!(outside.is_none());

        let next = svc.next_any(room, at(9, 0)).await.unwrap();
        assert_eq!(next.unwrap().start, at(11, 0));
    }

    #[tokio::test]
    async fn should_not_report_running_reservation_as_next() {
        let svc = make_service();
        svc.create(booking(1, at(8, 0), at(10, 0), 20)).await.unwrap();
        svc.create(booking(1, at(14, 0), at(15, 0), 20)).await.unwrap();

        let next = svc.next_any(RoomId::new(1), at(8, 0)).await.unwrap();
        assert_eq!(next.unwrap().start, at(14, 0));
    }

    #[tokio::test]
    async fn should_delete_idempotently() {
        let svc = make_service();
        let created = svc.create(booking(1, at(8, 0), at(10, 0), 20)).await.unwrap();

        svc.delete(created.id).await.unwrap();
        svc.delete(created.id).await.unwrap();

        let result = svc.get(created.id).await;
        assert!(matches!(result, Err(RateError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_filter_by_day() {
        let svc = make_service();
        svc.create(booking(1, at(8, 0), at(10, 0), 20)).await.unwrap();
        let next_day = at(8, 0) + Duration::days(1);
        svc.create(booking(2, next_day, next_day + Duration::hours(1), 5))
            .await
            .unwrap();

        let day = at(0, 0).date_naive();
        let listed = svc.list(None, Some(day)).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].room_id, RoomId::new(1));
    }
}
