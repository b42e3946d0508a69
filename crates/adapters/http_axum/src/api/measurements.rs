//! JSON REST handlers for sensor measurements.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use rate_app::ports::{
    ForecastModel, MeasurementLog, ReservationRepository, RoomRepository, WeatherProvider,
};
use rate_domain::error::{NotFoundError, RateError, ValidationError};
use rate_domain::id::RoomId;
use rate_domain::measurement::{Measurement, NewMeasurement, OccupancyContext, SensorReading};
use rate_domain::time::now;
use rate_domain::weather::WeatherConditions;

use super::{parse_room_id, parse_timestamp};
use crate::error::ApiError;
use crate::state::AppState;

/// Default number of rows returned by listings.
const DEFAULT_LIMIT: usize = 100;

fn default_sensor_id() -> String {
    "unknown".to_owned()
}

/// Body pushed by a sensor to `POST /measure`.
///
/// Occupancy and weather fields are optional; when a whole group is present
/// (replayed records) it is stored as-is instead of being derived. A group
/// that is only partly present is rejected.
#[derive(Debug, Deserialize)]
pub struct MeasureRequest {
    pub room_id: RoomId,
    #[serde(default = "default_sensor_id")]
    pub sensor_id: String,
    #[serde(alias = "temp")]
    pub temperature: f64,
    #[serde(alias = "hum")]
    pub humidity: f64,
    pub co2: f64,
    #[serde(default)]
    pub motion: bool,
    pub timestamp: Option<String>,
    pub people_count: Option<u32>,
    pub room_capacity: Option<u32>,
    pub occupancy_rate: Option<f64>,
    pub minutes_to_start: Option<i64>,
    #[serde(default, deserialize_with = "occupied_flag")]
    pub is_occupied: Option<bool>,
    pub res_duration_min: Option<i64>,
    pub outdoor_temp: Option<f64>,
    pub outdoor_hum: Option<f64>,
    pub wind_speed: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

/// Accepts `true`/`false` as well as the `0`/`1` written by dataset exports.
fn occupied_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Flag::Bool(value)) => Ok(Some(value)),
        Some(Flag::Int(0)) => Ok(Some(false)),
        Some(Flag::Int(1)) => Ok(Some(true)),
        Some(Flag::Int(other)) => Err(D::Error::custom(format!(
            "is_occupied must be a boolean, 0 or 1, got {other}"
        ))),
    }
}

fn partial(group: &'static str, missing: &'static str) -> ApiError {
    ValidationError::PartialContext { group, missing }.into()
}

impl MeasureRequest {
    fn occupancy(&self) -> Result<Option<OccupancyContext>, ApiError> {
        let fields = [
            self.people_count.is_some(),
            self.room_capacity.is_some(),
            self.occupancy_rate.is_some(),
            self.minutes_to_start.is_some(),
            self.is_occupied.is_some(),
            self.res_duration_min.is_some(),
        ];
        if !fields.contains(&true) {
            return Ok(None);
        }
        Ok(Some(OccupancyContext {
            people_count: self
                .people_count
                .ok_or_else(|| partial("occupancy", "people_count"))?,
            room_capacity: self
                .room_capacity
                .ok_or_else(|| partial("occupancy", "room_capacity"))?,
            occupancy_rate: self
                .occupancy_rate
                .ok_or_else(|| partial("occupancy", "occupancy_rate"))?,
            minutes_to_start: self
                .minutes_to_start
                .ok_or_else(|| partial("occupancy", "minutes_to_start"))?,
            is_occupied: self
                .is_occupied
                .ok_or_else(|| partial("occupancy", "is_occupied"))?,
            res_duration_min: self
                .res_duration_min
                .ok_or_else(|| partial("occupancy", "res_duration_min"))?,
        }))
    }

    fn weather(&self) -> Result<Option<WeatherConditions>, ApiError> {
        match (self.outdoor_temp, self.outdoor_hum, self.wind_speed) {
            (None, None, None) => Ok(None),
            (Some(outdoor_temp), Some(outdoor_hum), Some(wind_speed)) => {
                Ok(Some(WeatherConditions {
                    outdoor_temp,
                    outdoor_hum,
                    wind_speed,
                }))
            }
            (None, _, _) => Err(partial("weather", "outdoor_temp")),
            (_, None, _) => Err(partial("weather", "outdoor_hum")),
            (_, _, None) => Err(partial("weather", "wind_speed")),
        }
    }

    fn into_new_measurement(self) -> Result<NewMeasurement, ApiError> {
        let recorded_at = self.timestamp.as_deref().map(parse_timestamp).transpose()?;
        let occupancy = self.occupancy()?;
        let weather = self.weather()?;
        Ok(NewMeasurement {
            room_id: self.room_id,
            sensor_id: self.sensor_id,
            reading: SensorReading {
                temperature: self.temperature,
                humidity: self.humidity,
                co2: self.co2,
                motion: self.motion,
            },
            recorded_at,
            occupancy,
            weather,
        })
    }
}

/// Query parameters for listings.
#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

/// Possible responses from the ingestion endpoint.
pub enum MeasureResponse {
    Created(Json<Measurement>),
}

impl IntoResponse for MeasureResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the last-measurement endpoint.
pub enum LastResponse {
    Ok(Json<Measurement>),
}

impl IntoResponse for LastResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the list endpoints.
pub enum ListResponse {
    Ok(Json<Vec<Measurement>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `POST /measure`
pub async fn measure<M, R, L, W, F>(
    State(state): State<AppState<M, R, L, W, F>>,
    Json(req): Json<MeasureRequest>,
) -> Result<MeasureResponse, ApiError>
where
    M: RoomRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    L: MeasurementLog + Send + Sync + 'static,
    W: WeatherProvider + Send + Sync + 'static,
    F: ForecastModel + 'static,
{
    let incoming = req.into_new_measurement()?;
    let stored = state.orchestrator.ingest(incoming, now()).await?;
    Ok(MeasureResponse::Created(Json(stored)))
}

/// `GET /api/last`
pub async fn last<M, R, L, W, F>(
    State(state): State<AppState<M, R, L, W, F>>,
) -> Result<LastResponse, ApiError>
where
    M: RoomRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    L: MeasurementLog + Send + Sync + 'static,
    W: WeatherProvider + Send + Sync + 'static,
    F: ForecastModel + 'static,
{
    let last = state
        .orchestrator
        .measurements()
        .last()
        .await?
        .ok_or_else(|| {
            RateError::from(NotFoundError {
                entity: "Measurement",
                id: "last".to_owned(),
            })
        })?;
    Ok(LastResponse::Ok(Json(last)))
}

/// `GET /api/all?limit=`
pub async fn list<M, R, L, W, F>(
    State(state): State<AppState<M, R, L, W, F>>,
    Query(params): Query<LimitParams>,
) -> Result<ListResponse, ApiError>
where
    M: RoomRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    L: MeasurementLog + Send + Sync + 'static,
    W: WeatherProvider + Send + Sync + 'static,
    F: ForecastModel + 'static,
{
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let measurements = state.orchestrator.measurements().list(limit).await?;
    Ok(ListResponse::Ok(Json(measurements)))
}

/// `GET /api/rooms/{id}/measurements?limit=`
pub async fn list_for_room<M, R, L, W, F>(
    State(state): State<AppState<M, R, L, W, F>>,
    Path(id): Path<String>,
    Query(params): Query<LimitParams>,
) -> Result<ListResponse, ApiError>
where
    M: RoomRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    L: MeasurementLog + Send + Sync + 'static,
    W: WeatherProvider + Send + Sync + 'static,
    F: ForecastModel + 'static,
{
    let room_id = parse_room_id(&id)?;
    state.orchestrator.rooms().get_room(room_id).await?;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let measurements = state
        .orchestrator
        .measurements()
        .recent(room_id, limit)
        .await?;
    Ok(ListResponse::Ok(Json(measurements)))
}
