//! Forecast port: inference on a normalized feature window.

use rate_domain::error::ForecastError;
use rate_domain::forecast::FeatureRow;

/// A trained sequence model predicting the next normalized temperature.
///
/// Inference is CPU-bound and synchronous; the window is already scaled into
/// `[0, 1]` and holds exactly `SEQ_LEN` rows ordered oldest-first.
pub trait ForecastModel: Send + Sync {
    /// Return the normalized predicted temperature.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::ShapeMismatch`] when the window does not match
    /// the shape the model was trained on.
    fn predict(&self, window: &[FeatureRow]) -> Result<f64, ForecastError>;
}
