//! # rate-adapter-weather
//!
//! [`WeatherProvider`](rate_app::ports::WeatherProvider) backed by the
//! [Open-Meteo](https://open-meteo.com) forecast API.
//!
//! Only the `current` block is requested (`temperature_2m`,
//! `relative_humidity_2m`, `wind_speed_10m`). Caching and the fallback to
//! default conditions live in the application's weather service; this crate
//! only reports failures.

mod client;

pub use client::{OpenMeteoClient, OpenMeteoConfig, WeatherClientError};
