use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::classifier::SolverConfig;
use crate::error::PipelineError;
use crate::models::N_FEATURES;

pub const DEFAULT_CSV_PATH: &str = "Student Mental health.csv";
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;
pub const DEFAULT_SEED: u64 = 42;

/// Feature vector scored after training:
/// gender, age, year, CGPA, marital, anxiety, panic, treatment (encoded).
pub const SAMPLE_FEATURES: [f64; N_FEATURES] = [1.0, 21.0, 2.0, 3.25, 1.0, 1.0, 0.0, 0.0];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub csv_path: PathBuf,
    pub test_fraction: f64,
    pub seed: u64,
    pub solver: SolverConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
            solver: SolverConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "test fraction must be between 0 and 1, got {}",
                self.test_fraction
            )));
        }
        if self.solver.max_iter == 0 {
            return Err(PipelineError::InvalidConfig(
                "max iterations must be positive".to_string(),
            ));
        }
        if !(self.solver.c > 0.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "regularization strength C must be positive, got {}",
                self.solver.c
            )));
        }
        if !(self.solver.tolerance > 0.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "tolerance must be positive, got {}",
                self.solver.tolerance
            )));
        }
        Ok(())
    }
}
