//! Forecast service: turns recent history into a temperature prediction.

use rate_domain::error::ForecastError;
use rate_domain::forecast::{FEATURE_COUNT, FeatureWindow, Scalers};
use rate_domain::measurement::Measurement;
use rate_domain::weather::WeatherConditions;

use crate::ports::ForecastModel;

/// A loaded model together with the scalers it was trained with.
pub struct ForecastArtifacts<M> {
    model: M,
    scalers: Scalers,
}

impl<M: ForecastModel> ForecastArtifacts<M> {
    /// Pair a model with its scalers.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::ShapeMismatch`] if the input scaler is not
    /// fitted on every feature or the output scaler on a single column.
    pub fn new(model: M, scalers: Scalers) -> Result<Self, ForecastError> {
        scalers.input.check_columns(FEATURE_COUNT)?;
        scalers.output.check_columns(1)?;
        Ok(Self { model, scalers })
    }
}

/// Runs inference when artifacts were loaded at startup.
///
/// Availability is fixed for the lifetime of the service: without artifacts
/// every call fails with [`ForecastError::ModelUnavailable`].
pub struct ForecastService<M> {
    artifacts: Option<ForecastArtifacts<M>>,
}

impl<M: ForecastModel> ForecastService<M> {
    pub fn new(artifacts: Option<ForecastArtifacts<M>>) -> Self {
        Self { artifacts }
    }

    /// A service that never predicts.
    pub fn unavailable() -> Self {
        Self { artifacts: None }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.artifacts.is_some()
    }

    /// Predict the temperature from a room's recent history.
    ///
    /// `history` may be in any order; the newest entries form the window.
    /// Entries without stored weather use `weather`.
    ///
    /// # Errors
    ///
    /// - [`ForecastError::ModelUnavailable`] if no artifacts were loaded.
    /// - [`ForecastError::InsufficientHistory`] if fewer than the window
    ///   length are given.
    /// - [`ForecastError::ShapeMismatch`] if the model rejects the window.
    pub fn predict(
        &self,
        history: Vec<Measurement>,
        weather: &WeatherConditions,
    ) -> Result<f64, ForecastError> {
        let artifacts = self
            .artifacts
            .as_ref()
            .ok_or(ForecastError::ModelUnavailable)?;

        let window = FeatureWindow::from_history(history, weather)?;
        let normalized = window.normalized(&artifacts.scalers.input)?;
        let scaled = artifacts.model.predict(&normalized)?;
        let predicted = artifacts.scalers.output.inverse_transform(0, scaled)?;

        Ok((predicted * 100.0).round() / 100.0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rate_domain::forecast::{MinMaxScaler, SEQ_LEN};
    use rate_domain::id::RoomId;
    use rate_domain::measurement::SensorReading;

    use super::*;
    use crate::testing::{EchoModel, at};

    fn scalers() -> Scalers {
        let mut data_min = vec![0.0; FEATURE_COUNT];
        let mut data_max = vec![1.0; FEATURE_COUNT];
        data_min[0] = 10.0;
        data_max[0] = 30.0;
        Scalers {
            input: MinMaxScaler::new(data_min, data_max),
            output: MinMaxScaler::new(vec![10.0], vec![30.0]),
        }
    }

    fn history(count: usize) -> Vec<Measurement> {
        (0..count)
            .map(|i| {
                let offset = i64::try_from(i).unwrap();
                Measurement::builder()
                    .room_id(RoomId::new(1))
                    .reading(SensorReading {
                        temperature: 18.0 + offset as f64 * 0.1,
                        humidity: 50.0,
                        co2: 600.0,
                        motion: false,
                    })
                    .recorded_at(at(8, 0) + Duration::minutes(offset * 5))
                    .build()
            })
            .collect()
    }

    fn make_service() -> ForecastService<EchoModel> {
        ForecastService::new(Some(ForecastArtifacts::new(EchoModel, scalers()).unwrap()))
    }

    #[test]
    fn should_fail_with_model_unavailable_before_checking_history() {
        let svc: ForecastService<EchoModel> = ForecastService::unavailable();
        let result = svc.predict(Vec::new(), &WeatherConditions::DEFAULT);
        assert_eq!(result, Err(ForecastError::ModelUnavailable));
    }

    #[test]
    fn should_fail_with_insufficient_history_at_eleven() {
        let svc = make_service();
        let result = svc.predict(history(SEQ_LEN - 1), &WeatherConditions::DEFAULT);
        assert_eq!(
            result,
            Err(ForecastError::InsufficientHistory {
                required: SEQ_LEN,
                available: SEQ_LEN - 1,
            })
        );
    }

    #[test]
    fn should_predict_at_exactly_twelve() {
        let svc = make_service();
        let predicted = svc
            .predict(history(SEQ_LEN), &WeatherConditions::DEFAULT)
            .unwrap();
        // The echo model returns the newest normalized temperature.
        assert!((predicted - 19.1).abs() < 1e-9);
    }

    #[test]
    fn should_use_newest_readings_when_history_is_shuffled() {
        let svc = make_service();
        let mut shuffled = history(20);
        shuffled.reverse();
        let predicted = svc.predict(shuffled, &WeatherConditions::DEFAULT).unwrap();
        assert!((predicted - 19.9).abs() < 1e-9);
    }

    #[test]
    fn should_reject_artifacts_with_wrong_scaler_width() {
        let bad = Scalers {
            input: MinMaxScaler::new(vec![0.0; 3], vec![1.0; 3]),
            output: MinMaxScaler::new(vec![0.0], vec![1.0]),
        };
        let result = ForecastArtifacts::new(EchoModel, bad);
        assert!(matches!(
            result,
            Err(ForecastError::ShapeMismatch { expected: 16, .. })
        ));
    }
}
