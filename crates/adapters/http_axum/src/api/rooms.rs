//! JSON REST handlers for rooms.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use rate_app::ports::{
    ForecastModel, MeasurementLog, ReservationRepository, RoomRepository, WeatherProvider,
};
use rate_domain::room::Room;

use super::parse_room_id;
use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Room>>),
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
    Ok(Json<Room>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/rooms`
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
    let rooms = state.orchestrator.rooms().list_rooms().await?;
    Ok(ListResponse::Ok(Json(rooms)))
}

/// `GET /api/rooms/{id}`
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
    let room = state.orchestrator.rooms().get_room(room_id).await?;
    Ok(GetResponse::Ok(Json(room)))
}
