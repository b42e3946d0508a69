//! JSON REST handler for temperature forecasts.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use rate_app::ports::{
    ForecastModel, MeasurementLog, ReservationRepository, RoomRepository, WeatherProvider,
};
use rate_domain::forecast::ForecastResult;
use rate_domain::time::now;

use super::parse_room_id;
use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the forecast endpoint.
///
/// Failures map through [`ApiError`]: 422 when the room lacks history,
/// 503 when no model is loaded.
pub enum GetResponse {
    Ok(Json<ForecastResult>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/rooms/{id}/forecast`
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
    let forecast = state.orchestrator.forecast(room_id, now()).await?;
    Ok(GetResponse::Ok(Json(forecast)))
}
