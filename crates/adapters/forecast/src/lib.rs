//! # rate-adapter-forecast
//!
//! [`ForecastModel`](rate_app::ports::ForecastModel) implementation for the
//! recurrent regressor exported by the training pipeline.
//!
//! The artifact is a single JSON document holding the ordered feature list,
//! the window length, both min-max scalers and the layer weights. Inference
//! is a plain forward pass over stacked LSTM layers followed by a dense
//! output unit.

mod artifact;
mod lstm;

pub use artifact::{ArtifactError, from_json, load};
pub use lstm::LstmModel;
