//! `SQLite` implementation of [`ReservationRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use rate_app::ports::{ReservationFilter, ReservationRepository};
use rate_domain::error::RateError;
use rate_domain::id::{ReservationId, RoomId};
use rate_domain::reservation::Reservation;
use rate_domain::time::Timestamp;

use crate::error::StorageError;
use crate::room_repo::decode_u32;
use crate::timestamp;

/// Wrapper for converting database rows into domain [`Reservation`].
struct Wrapper(Reservation);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Reservation> {
        value.map(|w| w.0)
    }

    fn all(rows: Vec<Self>) -> Vec<Reservation> {
        rows.into_iter().map(|w| w.0).collect()
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let start: String = row.try_get("start_at")?;
        let end: String = row.try_get("end_at")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Self(Reservation {
            id: ReservationId::from_uuid(id),
            room_id: RoomId::new(decode_u32(row, "room_id")?),
            user_name: row.try_get("user_name")?,
            title: row.try_get("title")?,
            start: timestamp::decode(&start)?,
            end: timestamp::decode(&end)?,
            people_count: decode_u32(row, "people_count")?,
            created_at: timestamp::decode(&created_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO reservations (id, room_id, user_name, title, start_at, end_at, people_count, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
";

const SELECT_BY_ID: &str = "SELECT * FROM reservations WHERE id = ?";

const SELECT_FILTERED: &str = r"
    SELECT * FROM reservations
    WHERE (? IS NULL OR room_id = ?)
      AND (? IS NULL OR end_at > ?)
      AND (? IS NULL OR start_at < ?)
    ORDER BY start_at ASC
";

const SELECT_OVERLAPPING: &str = r"
    SELECT * FROM reservations
    WHERE room_id = ? AND NOT (end_at <= ? OR start_at >= ?)
    ORDER BY start_at ASC
";

const SELECT_CURRENT: &str = r"
    SELECT * FROM reservations
    WHERE room_id = ? AND start_at <= ? AND end_at >= ?
    ORDER BY start_at ASC
    LIMIT 1
";

const SELECT_NEXT: &str = r"
    SELECT * FROM reservations
    WHERE room_id = ? AND start_at > ? AND (? IS NULL OR start_at <= ?)
    ORDER BY start_at ASC
    LIMIT 1
";

const DELETE_BY_ID: &str = "DELETE FROM reservations WHERE id = ?";

/// `SQLite`-backed reservation repository.
#[derive(Clone)]
pub struct SqliteReservationRepository {
    pool: SqlitePool,
}

impl SqliteReservationRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ReservationRepository for SqliteReservationRepository {
    fn create(
        &self,
        reservation: Reservation,
    ) -> impl Future<Output = Result<Reservation, RateError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(reservation.id.as_uuid())
                .bind(i64::from(reservation.room_id.get()))
                .bind(&reservation.user_name)
                .bind(&reservation.title)
                .bind(timestamp::encode(reservation.start))
                .bind(timestamp::encode(reservation.end))
                .bind(i64::from(reservation.people_count))
                .bind(timestamp::encode(reservation.created_at))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(reservation)
        }
    }

    fn get_by_id(
        &self,
        id: ReservationId,
    ) -> impl Future<Output = Result<Option<Reservation>, RateError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.as_uuid())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn list(
        &self,
        filter: ReservationFilter,
    ) -> impl Future<Output = Result<Vec<Reservation>, RateError>> + Send {
        let pool = self.pool.clone();
        async move {
            let room_id = filter.room_id.map(|id| i64::from(id.get()));
            let from = filter.from.map(timestamp::encode);
            let to = filter.to.map(timestamp::encode);

            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_FILTERED)
                .bind(room_id)
                .bind(room_id)
                .bind(from.as_deref())
                .bind(from.as_deref())
                .bind(to.as_deref())
                .bind(to.as_deref())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::all(rows))
        }
    }

    fn find_overlapping(
        &self,
        room_id: RoomId,
        start: Timestamp,
        end: Timestamp,
    ) -> impl Future<Output = Result<Vec<Reservation>, RateError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_OVERLAPPING)
                .bind(i64::from(room_id.get()))
                .bind(timestamp::encode(start))
                .bind(timestamp::encode(end))
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::all(rows))
        }
    }

    fn find_current(
        &self,
        room_id: RoomId,
        at: Timestamp,
    ) -> impl Future<Output = Result<Option<Reservation>, RateError>> + Send {
        let pool = self.pool.clone();
        async move {
            let at = timestamp::encode(at);
            let row: Option<Wrapper> = sqlx::query_as(SELECT_CURRENT)
                .bind(i64::from(room_id.get()))
                .bind(&at)
                .bind(&at)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn find_next(
        &self,
        room_id: RoomId,
        after: Timestamp,
        until: Option<Timestamp>,
    ) -> impl Future<Output = Result<Option<Reservation>, RateError>> + Send {
        let pool = self.pool.clone();
        async move {
            let until = until.map(timestamp::encode);
            let row: Option<Wrapper> = sqlx::query_as(SELECT_NEXT)
                .bind(i64::from(room_id.get()))
                .bind(timestamp::encode(after))
                .bind(until.as_deref())
                .bind(until.as_deref())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn delete(&self, id: ReservationId) -> impl Future<Output = Result<(), RateError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(DELETE_BY_ID)
                .bind(id.as_uuid())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}
