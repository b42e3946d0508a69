use std::path::PathBuf;

use rate_domain::error::SensorFailure;

/// Failures while locating or reading sensor files.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("unable to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected value {value:?} in {path}")]
    Parse { path: PathBuf, value: String },

    #[error("no {channel} channel found in {dir}")]
    MissingChannel { dir: PathBuf, channel: &'static str },
}

impl From<SensorError> for SensorFailure {
    fn from(err: SensorError) -> Self {
        SensorFailure(Box::new(err))
    }
}
