//! `SQLite` implementation of [`RoomRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use rate_app::ports::RoomRepository;
use rate_domain::error::RateError;
use rate_domain::id::RoomId;
use rate_domain::room::Room;

use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`Room`].
struct Wrapper(Room);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Room> {
        value.map(|w| w.0)
    }
}

pub(crate) fn decode_u32(row: &SqliteRow, column: &str) -> Result<u32, sqlx::Error> {
    let value: i64 = row.try_get(column)?;
    u32::try_from(value).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Room {
            id: RoomId::new(decode_u32(row, "id")?),
            name: row.try_get("name")?,
            capacity: decode_u32(row, "capacity")?,
            floor: row.try_get("floor")?,
            description: row.try_get("description")?,
            sensor_id: row.try_get("sensor_id")?,
        }))
    }
}

const UPSERT: &str = r"
    INSERT INTO rooms (id, name, capacity, floor, description, sensor_id)
    VALUES (?, ?, ?, ?, ?, ?)
    ON CONFLICT (id) DO UPDATE SET
        name = excluded.name,
        capacity = excluded.capacity,
        floor = excluded.floor,
        description = excluded.description,
        sensor_id = excluded.sensor_id
";
const SELECT_BY_ID: &str = "SELECT * FROM rooms WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM rooms ORDER BY id";

/// `SQLite`-backed room repository.
#[derive(Clone)]
pub struct SqliteRoomRepository {
    pool: SqlitePool,
}

impl SqliteRoomRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RoomRepository for SqliteRoomRepository {
    fn upsert(&self, room: Room) -> impl Future<Output = Result<Room, RateError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPSERT)
                .bind(i64::from(room.id.get()))
                .bind(&room.name)
                .bind(i64::from(room.capacity))
                .bind(&room.floor)
                .bind(room.description.as_deref())
                .bind(room.sensor_id.as_deref())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(room)
        }
    }

    fn get_by_id(
        &self,
        id: RoomId,
    ) -> impl Future<Output = Result<Option<Room>, RateError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(i64::from(id.get()))
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Room>, RateError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }
}
