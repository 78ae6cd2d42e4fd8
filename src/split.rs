use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffled train/test partition of `0..rows`. The test share is rounded up,
/// and both sides must end up non-empty.
pub fn train_test_split(
    rows: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<SplitIndices, PipelineError> {
    let too_few = || PipelineError::TooFewRows {
        rows,
        test_fraction,
    };

    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(too_few());
    }

    let n_test = (test_fraction * rows as f64).ceil() as usize;
    if n_test == 0 || n_test >= rows {
        return Err(too_few());
    }

    let mut indices: Vec<usize> = (0..rows).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test = indices.split_off(rows - n_test);
    info!(
        "Split {} rows with seed {}: train={}, test={}",
        rows,
        seed,
        indices.len(),
        test.len()
    );

    Ok(SplitIndices {
        train: indices,
        test,
    })
}
