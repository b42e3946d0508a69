//! JSON REST handlers for reservations.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use serde::Deserialize;

use rate_app::ports::{
    ForecastModel, MeasurementLog, ReservationRepository, RoomRepository, WeatherProvider,
};
use rate_domain::error::ValidationError;
use rate_domain::id::{ReservationId, RoomId};
use rate_domain::reservation::Reservation;

use super::{parse_room_id, parse_timestamp};
use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for listing reservations.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// UTC day, `YYYY-MM-DD`.
    pub date: Option<String>,
    pub room_id: Option<String>,
}

/// Request body for creating a reservation.
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub room_id: RoomId,
    pub user_name: String,
    pub title: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub people_count: u32,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Reservation>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<Reservation>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Reservation>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

fn parse_reservation_id(raw: &str) -> Result<ReservationId, ApiError> {
    ReservationId::from_str(raw).map_err(|_| ValidationError::InvalidId(raw.to_owned()).into())
}

fn parse_day(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(raw.to_owned()).into())
}

/// `GET /api/reservations?date=&room_id=`
pub async fn list<M, R, L, W, F>(
    State(state): State<AppState<M, R, L, W, F>>,
    Query(params): Query<ListParams>,
) -> Result<ListResponse, ApiError>
where
    M: RoomRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    L: MeasurementLog + Send + Sync + 'static,
    W: WeatherProvider + Send + Sync + 'static,
    F: ForecastModel + 'static,
{
    let day = params.date.as_deref().map(parse_day).transpose()?;
    let room_id = params.room_id.as_deref().map(parse_room_id).transpose()?;
    let reservations = state
        .orchestrator
        .reservations()
        .list(room_id, day)
        .await?;
    Ok(ListResponse::Ok(Json(reservations)))
}

/// `POST /api/reservations`
pub async fn create<M, R, L, W, F>(
    State(state): State<AppState<M, R, L, W, F>>,
    Json(req): Json<CreateRequest>,
) -> Result<CreateResponse, ApiError>
where
    M: RoomRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    L: MeasurementLog + Send + Sync + 'static,
    W: WeatherProvider + Send + Sync + 'static,
    F: ForecastModel + 'static,
{
    let reservation = Reservation::builder()
        .room_id(req.room_id)
        .user_name(req.user_name)
        .title(req.title)
        .start(parse_timestamp(&req.start)?)
        .end(parse_timestamp(&req.end)?)
        .people_count(req.people_count)
        .build()?;
    let created = state.orchestrator.reservations().create(reservation).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `GET /api/reservations/{id}`
pub async fn get<M, R, L, W, F>(
    State(state): State<AppState<M, R, L, W, F>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    M: RoomRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    L: MeasurementLog + Send + Sync + 'static,
    W: WeatherProvider + Send + Sync + 'static,
    F: ForecastModel + 'static,
{
    let id = parse_reservation_id(&id)?;
    let reservation = state.orchestrator.reservations().get(id).await?;
    Ok(GetResponse::Ok(Json(reservation)))
}

/// `DELETE /api/reservations/{id}`
pub async fn delete<M, R, L, W, F>(
    State(state): State<AppState<M, R, L, W, F>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    M: RoomRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    L: MeasurementLog + Send + Sync + 'static,
    W: WeatherProvider + Send + Sync + 'static,
    F: ForecastModel + 'static,
{
    let id = parse_reservation_id(&id)?;
    state.orchestrator.reservations().delete(id).await?;
    Ok(DeleteResponse::NoContent)
}
