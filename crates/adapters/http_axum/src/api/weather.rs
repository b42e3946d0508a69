//! JSON REST handler for the cached weather snapshot.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use rate_app::ports::{
    ForecastModel, MeasurementLog, ReservationRepository, RoomRepository, WeatherProvider,
};
use rate_domain::time::now;
use rate_domain::weather::WeatherSnapshot;

use crate::state::AppState;

pub enum GetResponse {
    Ok(Json<WeatherSnapshot>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/weather`
///
/// Never fails: upstream errors surface as the default conditions.
pub async fn get<M, R, L, W, F>(State(state): State<AppState<M, R, L, W, F>>) -> GetResponse
where
    M: RoomRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    L: MeasurementLog + Send + Sync + 'static,
    W: WeatherProvider + Send + Sync + 'static,
    F: ForecastModel + 'static,
{
    let snapshot = state.orchestrator.weather().current(now()).await;
    GetResponse::Ok(Json(snapshot))
}
