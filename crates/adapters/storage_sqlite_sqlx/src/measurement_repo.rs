//! `SQLite` implementation of [`MeasurementLog`].
//!
//! Reads order by `recorded_at` and break ties with `rowid`, so "newest"
//! follows the log's append order when two readings share a timestamp.

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use rate_app::ports::MeasurementLog;
use rate_domain::error::RateError;
use rate_domain::id::{MeasurementId, RoomId};
use rate_domain::measurement::{Measurement, OccupancyContext, SensorReading};
use rate_domain::weather::WeatherConditions;

use crate::error::StorageError;
use crate::room_repo::decode_u32;
use crate::timestamp;

/// Wrapper for converting database rows into domain [`Measurement`].
struct Wrapper(Measurement);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Measurement> {
        value.map(|w| w.0)
    }

    fn all(rows: Vec<Self>) -> Vec<Measurement> {
        rows.into_iter().map(|w| w.0).collect()
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let recorded_at: String = row.try_get("recorded_at")?;

        let outdoor_temp: Option<f64> = row.try_get("outdoor_temp")?;
        let outdoor_hum: Option<f64> = row.try_get("outdoor_hum")?;
        let wind_speed: Option<f64> = row.try_get("wind_speed")?;
        let weather = match (outdoor_temp, outdoor_hum, wind_speed) {
            (Some(outdoor_temp), Some(outdoor_hum), Some(wind_speed)) => Some(WeatherConditions {
                outdoor_temp,
                outdoor_hum,
                wind_speed,
            }),
            _ => None,
        };

        Ok(Self(Measurement {
            id: MeasurementId::from_uuid(id),
            room_id: RoomId::new(decode_u32(row, "room_id")?),
            sensor_id: row.try_get("sensor_id")?,
            reading: SensorReading {
                temperature: row.try_get("temperature")?,
                humidity: row.try_get("humidity")?,
                co2: row.try_get("co2")?,
                motion: row.try_get("motion")?,
            },
            occupancy: OccupancyContext {
                people_count: decode_u32(row, "people_count")?,
                room_capacity: decode_u32(row, "room_capacity")?,
                occupancy_rate: row.try_get("occupancy_rate")?,
                minutes_to_start: row.try_get("minutes_to_start")?,
                is_occupied: row.try_get("is_occupied")?,
                res_duration_min: row.try_get("res_duration_min")?,
            },
            weather,
            recorded_at: timestamp::decode(&recorded_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO measurements (
        id, room_id, sensor_id, temperature, humidity, co2, motion,
        people_count, room_capacity, occupancy_rate, minutes_to_start, is_occupied, res_duration_min,
        outdoor_temp, outdoor_hum, wind_speed, recorded_at
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const SELECT_RECENT_FOR_ROOM: &str = r"
    SELECT * FROM measurements
    WHERE room_id = ?
    ORDER BY recorded_at DESC, rowid DESC
    LIMIT ?
";

const SELECT_RECENT: &str = r"
    SELECT * FROM measurements
    ORDER BY recorded_at DESC, rowid DESC
    LIMIT ?
";

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// `SQLite`-backed measurement log.
#[derive(Clone)]
pub struct SqliteMeasurementLog {
    pool: SqlitePool,
}

impl SqliteMeasurementLog {
    /// Create a new log using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn recent_for(
        &self,
        room_id: Option<RoomId>,
        limit: usize,
    ) -> Result<Vec<Measurement>, RateError> {
        let rows: Vec<Wrapper> = match room_id {
            Some(room_id) => {
                sqlx::query_as::<_, Wrapper>(SELECT_RECENT_FOR_ROOM)
                    .bind(i64::from(room_id.get()))
                    .bind(sql_limit(limit))
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query_as::<_, Wrapper>(SELECT_RECENT)
                    .bind(sql_limit(limit))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(StorageError::from)?;

        Ok(Wrapper::all(rows))
    }
}

impl MeasurementLog for SqliteMeasurementLog {
    fn append(
        &self,
        measurement: Measurement,
    ) -> impl Future<Output = Result<Measurement, RateError>> + Send {
        let pool = self.pool.clone();
        async move {
            let occupancy = &measurement.occupancy;
            let weather = measurement.weather.as_ref();
            sqlx::query(INSERT)
                .bind(measurement.id.as_uuid())
                .bind(i64::from(measurement.room_id.get()))
                .bind(&measurement.sensor_id)
                .bind(measurement.reading.temperature)
                .bind(measurement.reading.humidity)
                .bind(measurement.reading.co2)
                .bind(measurement.reading.motion)
                .bind(i64::from(occupancy.people_count))
                .bind(i64::from(occupancy.room_capacity))
                .bind(occupancy.occupancy_rate)
                .bind(occupancy.minutes_to_start)
                .bind(occupancy.is_occupied)
                .bind(occupancy.res_duration_min)
                .bind(weather.map(|w| w.outdoor_temp))
                .bind(weather.map(|w| w.outdoor_hum))
                .bind(weather.map(|w| w.wind_speed))
                .bind(timestamp::encode(measurement.recorded_at))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(measurement)
        }
    }

    fn latest_for_room(
        &self,
        room_id: RoomId,
    ) -> impl Future<Output = Result<Option<Measurement>, RateError>> + Send {
        async move {
            let rows = self.recent_for(Some(room_id), 1).await?;
            Ok(rows.into_iter().next())
        }
    }

    fn recent_for_room(
        &self,
        room_id: RoomId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Measurement>, RateError>> + Send {
        self.recent_for(Some(room_id), limit)
    }

    fn last(&self) -> impl Future<Output = Result<Option<Measurement>, RateError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_RECENT)
                .bind(1_i64)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn list_recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Measurement>, RateError>> + Send {
        self.recent_for(None, limit)
    }
}
