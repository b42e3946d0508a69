//! JSON REST handlers for per-room heating status.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use rate_app::ports::{
    ForecastModel, MeasurementLog, ReservationRepository, RoomRepository, WeatherProvider,
};
use rate_domain::room_status::RoomStatus;
use rate_domain::time::now;

use super::parse_room_id;
use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<RoomStatus>>),
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
    Ok(Json<RoomStatus>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/rooms/status`
pub async fn list<M, R, L, W, F>(
    State(state): State<AppState<M, R, L, W, F>>,
) -> Result<ListResponse, ApiError>
where
    M: RoomRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    L: MeasurementLog + Send + Sync + 'static,
    W: WeatherProvider + Send + Sync + 'static,
    F: ForecastModel + 'static,
{
    let statuses = state.orchestrator.room_statuses(now()).await?;
    Ok(ListResponse::Ok(Json(statuses)))
}

/// `GET /api/rooms/{id}/status`
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
    let room_id = parse_room_id(&id)?;
    let status = state.orchestrator.room_status(room_id, now()).await?;
    Ok(GetResponse::Ok(Json(status)))
}
