//! # rated
//!
//! The rate daemon.
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (`rate.toml` plus environment overrides)
//! - Initialize the `SQLite` connection pool and run migrations
//! - Upsert the configured rooms
//! - Load the forecast artifact if present
//! - Construct application services, injecting adapters via port traits
//! - Spawn the sensor poller for the configured room
//! - Build the axum router and serve until SIGTERM/SIGINT
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;

use rate_adapter_forecast::LstmModel;
use rate_adapter_http_axum::state::AppState;
use rate_adapter_sensor::{HardwareSensor, SimulatedSensor};
use rate_adapter_storage_sqlite_sqlx::{
    SqliteMeasurementLog, SqliteReservationRepository, SqliteRoomRepository,
};
use rate_adapter_weather::OpenMeteoClient;
use rate_app::orchestrator::Orchestrator;
use rate_app::ports::SensorSource;
use rate_app::sensor_poller::{MeasurementSink, SensorPoller};
use rate_app::services::{
    ForecastArtifacts, ForecastService, MeasurementService, ReservationService, RoomService,
    WeatherService,
};
use rate_domain::id::RoomId;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, SensorMode};

fn load_forecast(config: &Config) -> ForecastService<LstmModel> {
    let path = &config.forecast.model_path;
    let artifacts = rate_adapter_forecast::load(path)
        .map_err(|err| {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "forecast model unavailable"
            );
        })
        .ok()
        .and_then(|(model, scalers)| {
            ForecastArtifacts::new(model, scalers)
                .map_err(|err| tracing::warn!(error = %err, "forecast scalers rejected"))
                .ok()
        });
    ForecastService::new(artifacts)
}

fn spawn_poller<S, K>(
    source: S,
    sink: Arc<K>,
    config: &Config,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    S: SensorSource + Send + Sync + 'static,
    K: MeasurementSink + 'static,
{
    let poller = SensorPoller::new(
        source,
        sink,
        RoomId::new(config.sensor.room_id),
        config.sensor.sensor_id.clone(),
        config.poll_interval(),
    );
    tokio::spawn(poller.run(shutdown))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "unable to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown requested");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = rate_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Repositories
    let room_repo = SqliteRoomRepository::new(pool.clone());
    let reservation_repo = SqliteReservationRepository::new(pool.clone());
    let measurement_log = SqliteMeasurementLog::new(pool);

    let rooms = RoomService::new(room_repo.clone());
    for seed in &config.rooms {
        let room = rooms.upsert_room(seed.to_room()?).await?;
        tracing::debug!(room_id = %room.id, name = %room.name, "room seeded");
    }
    tracing::info!(count = config.rooms.len(), "rooms ready");

    // Forecast and weather
    let forecast = load_forecast(&config);
    let weather_client = OpenMeteoClient::new(&config.open_meteo())?;

    // Services
    let orchestrator = Arc::new(Orchestrator::new(
        rooms,
        ReservationService::new(reservation_repo, room_repo),
        MeasurementService::new(measurement_log),
        WeatherService::with_freshness(weather_client, config.weather_freshness()),
        forecast,
        config.heating_settings(),
    ));

    // Sensor
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = match config.sensor.mode {
        SensorMode::Simulated => Some(spawn_poller(
            SimulatedSensor::from_clock(),
            Arc::clone(&orchestrator),
            &config,
            shutdown_rx,
        )),
        SensorMode::Hardware => {
            let sensor = HardwareSensor::open(
                &config.sensor.iio_device_dir,
                &config.sensor.motion_gpio_value,
            )?;
            Some(spawn_poller(
                sensor,
                Arc::clone(&orchestrator),
                &config,
                shutdown_rx,
            ))
        }
        SensorMode::Disabled => {
            tracing::info!("sensor polling disabled");
            None
        }
    };

    // HTTP
    let app = rate_adapter_http_axum::router::build(AppState::from_arc(orchestrator));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "rated listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    if let Some(poller) = poller {
        poller.await?;
    }
    tracing::info!("rated stopped");

    Ok(())
}
