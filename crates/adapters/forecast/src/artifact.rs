//! Loading and validating the exported model artifact.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use rate_domain::error::ForecastError;
use rate_domain::forecast::{FEATURE_COUNT, FEATURES, MinMaxScaler, SEQ_LEN, Scalers};

use crate::lstm::{DenseLayer, LstmLayer, LstmModel, Matrix};

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("unable to read model artifact {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model artifact")]
    Json(#[from] serde_json::Error),

    #[error("feature {position} is {found:?}, expected {expected:?}")]
    FeatureMismatch {
        position: usize,
        expected: &'static str,
        found: String,
    },

    #[error("artifact declares {found} features, expected 16")]
    FeatureCount { found: usize },

    #[error("artifact window length is {found}, expected 12")]
    SequenceLength { found: usize },

    #[error("invalid scaler")]
    Scaler(#[from] ForecastError),

    #[error("layer {index}: {reason}")]
    Shape { index: usize, reason: String },
}

#[derive(Debug, Deserialize)]
struct Artifact {
    features: Vec<String>,
    seq_len: usize,
    input_scaler: MinMaxScaler,
    output_scaler: MinMaxScaler,
    layers: Vec<LayerSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum LayerSpec {
    Lstm {
        kernel: Vec<Vec<f64>>,
        recurrent_kernel: Vec<Vec<f64>>,
        bias: Vec<f64>,
    },
    Dense {
        kernel: Vec<Vec<f64>>,
        bias: Vec<f64>,
    },
}

fn shape(index: usize, reason: impl Into<String>) -> ArtifactError {
    ArtifactError::Shape {
        index,
        reason: reason.into(),
    }
}

fn matrix(index: usize, name: &str, rows: &[Vec<f64>]) -> Result<Matrix, ArtifactError> {
    Matrix::from_rows(rows).ok_or_else(|| shape(index, format!("{name} has ragged rows")))
}

fn check_features(features: &[String]) -> Result<(), ArtifactError> {
    if features.len() != FEATURE_COUNT {
        return Err(ArtifactError::FeatureCount {
            found: features.len(),
        });
    }
    for (position, (found, expected)) in features.iter().zip(FEATURES).enumerate() {
        if found != expected {
            return Err(ArtifactError::FeatureMismatch {
                position,
                expected,
                found: found.clone(),
            });
        }
    }
    Ok(())
}

fn build_lstm(
    index: usize,
    inputs: usize,
    kernel: &[Vec<f64>],
    recurrent_kernel: &[Vec<f64>],
    bias: Vec<f64>,
) -> Result<LstmLayer, ArtifactError> {
    if bias.is_empty() || !bias.len().is_multiple_of(4) {
        return Err(shape(index, format!("bias length {} is not 4 × units", bias.len())));
    }
    let units = bias.len() / 4;
    let kernel = matrix(index, "kernel", kernel)?;
    let recurrent = matrix(index, "recurrent_kernel", recurrent_kernel)?;
    if kernel.rows() != inputs || kernel.cols() != 4 * units {
        return Err(shape(
            index,
            format!(
                "kernel is {}×{}, expected {inputs}×{}",
                kernel.rows(),
                kernel.cols(),
                4 * units
            ),
        ));
    }
    if recurrent.rows() != units || recurrent.cols() != 4 * units {
        return Err(shape(
            index,
            format!(
                "recurrent_kernel is {}×{}, expected {units}×{}",
                recurrent.rows(),
                recurrent.cols(),
                4 * units
            ),
        ));
    }
    Ok(LstmLayer {
        units,
        kernel,
        recurrent,
        bias,
    })
}

fn build_model(artifact: Artifact) -> Result<(LstmModel, Scalers), ArtifactError> {
    check_features(&artifact.features)?;
    if artifact.seq_len != SEQ_LEN {
        return Err(ArtifactError::SequenceLength {
            found: artifact.seq_len,
        });
    }
    artifact.input_scaler.check_columns(FEATURE_COUNT)?;
    artifact.output_scaler.check_columns(1)?;

    let mut lstm = Vec::new();
    let mut dense = None;
    let mut inputs = FEATURE_COUNT;
    let count = artifact.layers.len();

    for (index, layer) in artifact.layers.into_iter().enumerate() {
        match layer {
            LayerSpec::Lstm {
                kernel,
                recurrent_kernel,
                bias,
            } => {
                if dense.is_some() {
                    return Err(shape(index, "lstm layer after the dense head"));
                }
                let layer = build_lstm(index, inputs, &kernel, &recurrent_kernel, bias)?;
                inputs = layer.units;
                lstm.push(layer);
            }
            LayerSpec::Dense { kernel, bias } => {
                if index + 1 != count {
                    return Err(shape(index, "dense head must be the last layer"));
                }
                let kernel = matrix(index, "kernel", &kernel)?;
                if kernel.rows() != inputs || kernel.cols() != 1 {
                    return Err(shape(
                        index,
                        format!(
                            "kernel is {}×{}, expected {inputs}×1",
                            kernel.rows(),
                            kernel.cols()
                        ),
                    ));
                }
                let [bias] = bias.as_slice() else {
                    return Err(shape(index, "dense bias must hold one value"));
                };
                dense = Some(DenseLayer {
                    kernel,
                    bias: *bias,
                });
            }
        }
    }

    if lstm.is_empty() {
        return Err(shape(0, "no lstm layer"));
    }
    let dense = dense.ok_or_else(|| shape(count, "missing dense head"))?;

    let scalers = Scalers {
        input: artifact.input_scaler,
        output: artifact.output_scaler,
    };
    Ok((LstmModel::new(artifact.seq_len, lstm, dense), scalers))
}

/// Parse and validate an artifact document.
///
/// # Errors
///
/// Returns an [`ArtifactError`] describing the first inconsistency found.
pub fn from_json(document: &str) -> Result<(LstmModel, Scalers), ArtifactError> {
    let artifact: Artifact = serde_json::from_str(document)?;
    build_model(artifact)
}

/// Read an artifact from disk.
///
/// # Errors
///
/// Returns [`ArtifactError::Io`] if the file cannot be read, or any
/// validation error from [`from_json`].
pub fn load(path: impl AsRef<Path>) -> Result<(LstmModel, Scalers), ArtifactError> {
    let path = path.as_ref();
    let document = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let loaded = from_json(&document)?;
    tracing::info!(
        path = %path.display(),
        layers = loaded.0.layer_count(),
        "forecast model loaded"
    );
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use rate_app::ports::ForecastModel;
    use rate_domain::forecast::FeatureRow;
    use serde_json::{Value, json};

    use super::*;

    fn zeros(rows: usize, cols: usize) -> Value {
        json!(vec![vec![0.0; cols]; rows])
    }

    fn artifact() -> Value {
        json!({
            "features": FEATURES,
            "seq_len": 12,
            "input_scaler": {
                "data_min": vec![0.0; FEATURE_COUNT],
                "data_max": vec![1.0; FEATURE_COUNT],
            },
            "output_scaler": { "data_min": [10.0], "data_max": [30.0] },
            "layers": [
                {
                    "type": "lstm",
                    "kernel": zeros(FEATURE_COUNT, 8),
                    "recurrent_kernel": zeros(2, 8),
                    "bias": vec![0.0; 8],
                },
                { "type": "dense", "kernel": zeros(2, 1), "bias": [0.4] },
            ],
        })
    }

    fn load_value(value: &Value) -> Result<(LstmModel, Scalers), ArtifactError> {
        from_json(&value.to_string())
    }

    #[test]
    fn should_load_valid_artifact() {
        let (model, scalers) = load_value(&artifact()).unwrap();

        assert_eq!(model.seq_len(), SEQ_LEN);
        assert_eq!(model.layer_count(), 2);
        assert_eq!(scalers.input.columns(), FEATURE_COUNT);
        let window: Vec<FeatureRow> = vec![[0.5; FEATURE_COUNT]; SEQ_LEN];
        let scaled = model.predict(&window).unwrap();
        assert!((scaled - 0.4).abs() < 1e-12);
        let degrees = scalers.output.inverse_transform(0, scaled).unwrap();
        assert!((degrees - 18.0).abs() < 1e-9);
    }

    #[test]
    fn should_reject_reordered_features() {
        let mut value = artifact();
        value["features"][0] = json!("hum");
        value["features"][1] = json!("temp");

        let err = load_value(&value).unwrap_err();

        assert!(matches!(
            err,
            ArtifactError::FeatureMismatch {
                position: 0,
                expected: "temp",
                ..
            }
        ));
    }

    #[test]
    fn should_reject_other_window_length() {
        let mut value = artifact();
        value["seq_len"] = json!(24);

        assert!(matches!(
            load_value(&value).unwrap_err(),
            ArtifactError::SequenceLength { found: 24 }
        ));
    }

    #[test]
    fn should_reject_scaler_of_wrong_width() {
        let mut value = artifact();
        value["input_scaler"]["data_max"] = json!(vec![1.0; 15]);

        assert!(matches!(
            load_value(&value).unwrap_err(),
            ArtifactError::Scaler(ForecastError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn should_reject_kernel_not_matching_units() {
        let mut value = artifact();
        value["layers"][0]["recurrent_kernel"] = zeros(3, 8);

        assert!(matches!(
            load_value(&value).unwrap_err(),
            ArtifactError::Shape { index: 0, .. }
        ));
    }

    #[test]
    fn should_reject_dense_head_of_wrong_width() {
        let mut value = artifact();
        value["layers"][1]["kernel"] = zeros(4, 1);

        assert!(matches!(
            load_value(&value).unwrap_err(),
            ArtifactError::Shape { index: 1, .. }
        ));
    }

    #[test]
    fn should_reject_artifact_without_dense_head() {
        let mut value = artifact();
        value["layers"].as_array_mut().unwrap().pop();

        assert!(matches!(
            load_value(&value).unwrap_err(),
            ArtifactError::Shape { .. }
        ));
    }

    #[test]
    fn should_report_missing_file() {
        let err = load("/nonexistent/rate_model.json").unwrap_err();

        assert!(matches!(err, ArtifactError::Io { .. }));
    }
}
