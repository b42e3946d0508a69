//! Shared application state for axum handlers.

use std::sync::Arc;

use rate_app::orchestrator::Orchestrator;
use rate_app::ports::{
    ForecastModel, MeasurementLog, ReservationRepository, RoomRepository, WeatherProvider,
};

/// Application state shared across all axum handlers.
///
/// Generic over the port implementations to avoid dynamic dispatch.
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone`; only the `Arc` wrapper is cloned.
pub struct AppState<M, R, L, W, F> {
    /// Every use-case is reached through the orchestrator.
    pub orchestrator: Arc<Orchestrator<M, R, L, W, F>>,
}

impl<M, R, L, W, F> Clone for AppState<M, R, L, W, F> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
        }
    }
}

impl<M, R, L, W, F> AppState<M, R, L, W, F>
where
    M: RoomRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    L: MeasurementLog + Send + Sync + 'static,
    W: WeatherProvider + Send + Sync + 'static,
    F: ForecastModel + 'static,
{
    /// Create a new application state owning the orchestrator.
    pub fn new(orchestrator: Orchestrator<M, R, L, W, F>) -> Self {
        Self::from_arc(Arc::new(orchestrator))
    }

    /// Create a new application state from a pre-wrapped orchestrator.
    ///
    /// Use this when the orchestrator is shared with background tasks
    /// such as the sensor poller.
    pub fn from_arc(orchestrator: Arc<Orchestrator<M, R, L, W, F>>) -> Self {
        Self { orchestrator }
    }
}
