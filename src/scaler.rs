use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::error::PipelineError;

const MIN_STD: f64 = 1e-12;

/// Z-score standardization with statistics taken from the fit matrix.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    means: Array1<f64>,
    stds: Array1<f64>,
}

impl StandardScaler {
    /// Population standard deviation (ddof = 0). Constant columns get a
    /// std of 1 so they transform to zero instead of dividing by zero.
    pub fn fit(features: &Array2<f64>) -> Result<Self, PipelineError> {
        if features.nrows() == 0 {
            return Err(PipelineError::EmptyDataset);
        }

        let means = features
            .mean_axis(Axis(0))
            .ok_or(PipelineError::EmptyDataset)?;
        let stds = features
            .std_axis(Axis(0), 0.0)
            .mapv(|std| if std < MIN_STD { 1.0 } else { std });

        Ok(Self { means, stds })
    }

    pub fn means(&self) -> &Array1<f64> {
        &self.means
    }

    pub fn stds(&self) -> &Array1<f64> {
        &self.stds
    }

    pub fn transform(&self, features: &Array2<f64>) -> Result<Array2<f64>, PipelineError> {
        self.check_width(features.ncols())?;
        Ok((features - &self.means) / &self.stds)
    }

    pub fn transform_row(&self, row: ArrayView1<f64>) -> Result<Array1<f64>, PipelineError> {
        self.check_width(row.len())?;
        Ok((&row - &self.means) / &self.stds)
    }

    fn check_width(&self, actual: usize) -> Result<(), PipelineError> {
        if actual != self.means.len() {
            return Err(PipelineError::FeatureMismatch {
                expected: self.means.len(),
                actual,
            });
        }
        Ok(())
    }
}
