//! Forward pass of stacked LSTM layers and a dense head.
//!
//! Weights follow the Keras layout: `kernel` is `[inputs × 4·units]`,
//! `recurrent_kernel` is `[units × 4·units]` and gates are packed in the
//! order input, forget, cell, output.

use rate_app::ports::ForecastModel;
use rate_domain::error::ForecastError;
use rate_domain::forecast::FeatureRow;

/// Row-major dense matrix.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Build from nested rows; `None` when rows are ragged.
    pub(crate) fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != cols) {
            return None;
        }
        Some(Self {
            rows: rows.len(),
            cols,
            data: rows.concat(),
        })
    }

    pub(crate) fn rows(&self) -> usize {
        self.rows
    }

    pub(crate) fn cols(&self) -> usize {
        self.cols
    }

    /// `out += v · self`
    fn accumulate(&self, v: &[f64], out: &mut [f64]) {
        for (value, row) in v.iter().zip(self.data.chunks_exact(self.cols)) {
            for (acc, weight) in out.iter_mut().zip(row) {
                *acc += value * weight;
            }
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LstmLayer {
    pub(crate) units: usize,
    pub(crate) kernel: Matrix,
    pub(crate) recurrent: Matrix,
    pub(crate) bias: Vec<f64>,
}

impl LstmLayer {
    /// Run over `sequence`, returning the hidden state after every step.
    fn run(&self, sequence: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let u = self.units;
        let mut hidden = vec![0.0; u];
        let mut cell = vec![0.0; u];
        let mut outputs = Vec::with_capacity(sequence.len());

        for input in sequence {
            let mut z = self.bias.clone();
            self.kernel.accumulate(input, &mut z);
            self.recurrent.accumulate(&hidden, &mut z);

            let (input_gate, rest) = z.split_at(u);
            let (forget_gate, rest) = rest.split_at(u);
            let (candidate, output_gate) = rest.split_at(u);
            for (k, (c, h)) in cell.iter_mut().zip(hidden.iter_mut()).enumerate() {
                *c = sigmoid(forget_gate[k]) * *c + sigmoid(input_gate[k]) * candidate[k].tanh();
                *h = sigmoid(output_gate[k]) * c.tanh();
            }
            outputs.push(hidden.clone());
        }
        outputs
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DenseLayer {
    pub(crate) kernel: Matrix,
    pub(crate) bias: f64,
}

/// Trained temperature regressor.
#[derive(Debug, Clone, PartialEq)]
pub struct LstmModel {
    seq_len: usize,
    lstm: Vec<LstmLayer>,
    dense: DenseLayer,
}

impl LstmModel {
    pub(crate) fn new(seq_len: usize, lstm: Vec<LstmLayer>, dense: DenseLayer) -> Self {
        Self {
            seq_len,
            lstm,
            dense,
        }
    }

    /// Window length the model was trained on.
    #[must_use]
    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    /// Number of layers including the dense head.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.lstm.len() + 1
    }
}

impl ForecastModel for LstmModel {
    fn predict(&self, window: &[FeatureRow]) -> Result<f64, ForecastError> {
        if window.len() != self.seq_len {
            return Err(ForecastError::ShapeMismatch {
                expected: self.seq_len,
                actual: window.len(),
            });
        }

        let mut sequence: Vec<Vec<f64>> = window.iter().map(|row| row.to_vec()).collect();
        for layer in &self.lstm {
            sequence = layer.run(&sequence);
        }
        let last = sequence.last().ok_or(ForecastError::ShapeMismatch {
            expected: self.seq_len,
            actual: 0,
        })?;

        let mut out = [self.dense.bias];
        self.dense.kernel.accumulate(last, &mut out);
        Ok(out[0])
    }
}

#[cfg(test)]
mod tests {
    use rate_domain::forecast::FEATURE_COUNT;

    use super::*;

    fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix::from_rows(&vec![vec![0.0; cols]; rows]).unwrap()
    }

    fn single_unit(kernel: Matrix, bias: [f64; 4]) -> LstmLayer {
        LstmLayer {
            units: 1,
            kernel,
            recurrent: zeros(1, 4),
            bias: bias.to_vec(),
        }
    }

    fn head(weight: f64, bias: f64) -> DenseLayer {
        DenseLayer {
            kernel: Matrix::from_rows(&[vec![weight]]).unwrap(),
            bias,
        }
    }

    fn window(value: f64) -> Vec<FeatureRow> {
        vec![[value; FEATURE_COUNT]; 12]
    }

    #[test]
    fn should_output_dense_bias_when_weights_are_zero() {
        let model = LstmModel::new(
            12,
            vec![single_unit(zeros(FEATURE_COUNT, 4), [0.0; 4])],
            head(3.0, 0.25),
        );

        let prediction = model.predict(&window(0.7)).unwrap();

        assert!((prediction - 0.25).abs() < 1e-12);
    }

    #[test]
    fn should_follow_gate_order_input_forget_cell_output() {
        // Every step: i = σ(0), f ≈ 0, candidate = tanh(1), o ≈ 1.
        let model = LstmModel::new(
            12,
            vec![single_unit(zeros(FEATURE_COUNT, 4), [0.0, -100.0, 1.0, 100.0])],
            head(1.0, 0.0),
        );

        let prediction = model.predict(&window(0.0)).unwrap();

        let cell = 0.5 * 1f64.tanh();
        assert!((prediction - cell.tanh()).abs() < 1e-9);
    }

    #[test]
    fn should_respond_to_the_first_feature() {
        let mut rows = vec![vec![0.0; 4]; FEATURE_COUNT];
        rows[0] = vec![0.0, 0.0, 2.0, 0.0];
        let model = LstmModel::new(
            12,
            vec![single_unit(Matrix::from_rows(&rows).unwrap(), [0.0; 4])],
            head(1.0, 0.0),
        );

        let cold = model.predict(&window(0.1)).unwrap();
        let warm = model.predict(&window(0.9)).unwrap();

        assert!(warm > cold);
    }

    #[test]
    fn should_chain_stacked_layers() {
        let first = LstmLayer {
            units: 2,
            kernel: zeros(FEATURE_COUNT, 8),
            recurrent: zeros(2, 8),
            bias: vec![0.0, 0.0, -100.0, -100.0, 1.0, 1.0, 100.0, 100.0],
        };
        let second = single_unit(zeros(2, 4), [0.0; 4]);
        let model = LstmModel::new(12, vec![first, second], head(1.0, 0.0));

        assert!(model.predict(&window(0.5)).unwrap().is_finite());
    }

    #[test]
    fn should_reject_window_of_wrong_length() {
        let model = LstmModel::new(
            12,
            vec![single_unit(zeros(FEATURE_COUNT, 4), [0.0; 4])],
            head(1.0, 0.0),
        );

        let err = model.predict(&window(0.0)[..11]).unwrap_err();

        assert_eq!(
            err,
            ForecastError::ShapeMismatch {
                expected: 12,
                actual: 11
            }
        );
    }

    #[test]
    fn should_refuse_ragged_matrix() {
        assert!(Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).is_none());
    }
}
