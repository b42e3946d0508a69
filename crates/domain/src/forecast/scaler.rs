//! Per-column min-max scaling into `[0, 1]`.

use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// Min-max scaler fitted at training time.
///
/// A column whose minimum equals its maximum is treated as having a range of
/// `1`, so constant features map to `0` instead of dividing by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub data_min: Vec<f64>,
    pub data_max: Vec<f64>,
}

impl MinMaxScaler {
    #[must_use]
    pub fn new(data_min: Vec<f64>, data_max: Vec<f64>) -> Self {
        Self { data_min, data_max }
    }

    /// Number of columns the scaler was fitted on.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.data_min.len()
    }

    /// Check that both bound vectors describe `columns` columns.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::ShapeMismatch`] on any length disagreement.
    pub fn check_columns(&self, columns: usize) -> Result<(), ForecastError> {
        for len in [self.data_min.len(), self.data_max.len()] {
            if len != columns {
                return Err(ForecastError::ShapeMismatch {
                    expected: columns,
                    actual: len,
                });
            }
        }
        Ok(())
    }

    fn range(&self, column: usize) -> f64 {
        let range = self.data_max[column] - self.data_min[column];
        if range.abs() < f64::EPSILON { 1.0 } else { range }
    }

    /// Scale one row in place.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::ShapeMismatch`] if the row width differs from
    /// the fitted column count.
    pub fn transform(&self, row: &mut [f64]) -> Result<(), ForecastError> {
        if row.len() != self.columns() {
            return Err(ForecastError::ShapeMismatch {
                expected: self.columns(),
                actual: row.len(),
            });
        }
        self.check_columns(row.len())?;
        for (column, value) in row.iter_mut().enumerate() {
            *value = (*value - self.data_min[column]) / self.range(column);
        }
        Ok(())
    }

    /// Map a scaled value of `column` back to original units.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::ShapeMismatch`] if `column` is out of range.
    pub fn inverse_transform(&self, column: usize, value: f64) -> Result<f64, ForecastError> {
        if column >= self.columns().min(self.data_max.len()) {
            return Err(ForecastError::ShapeMismatch {
                expected: self.columns(),
                actual: column + 1,
            });
        }
        Ok(value * self.range(column) + self.data_min[column])
    }
}
