//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod forecast_service;
pub mod measurement_service;
pub mod reservation_service;
pub mod room_service;
pub mod weather_service;

pub use forecast_service::{ForecastArtifacts, ForecastService};
pub use measurement_service::MeasurementService;
pub use reservation_service::ReservationService;
pub use room_service::RoomService;
pub use weather_service::WeatherService;
