//! Multinomial logistic regression with an L2 penalty on the coefficients.
//!
//! The objective is the mean cross-entropy over training rows plus
//! `||W||^2 / (2 * C * n)`; intercepts are not penalized. It is minimized
//! with accelerated gradient descent, a backtracking line search and a
//! momentum restart whenever a step would raise the loss.

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PipelineError;

const MIN_STEP: f64 = 1e-12;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Iteration cap; hitting it is a warning, not an error
    pub max_iter: usize,
    /// Convergence threshold on the largest absolute gradient entry
    pub tolerance: f64,
    /// Inverse regularization strength
    pub c: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-4,
            c: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitReport {
    pub iterations: usize,
    pub final_loss: f64,
    pub converged: bool,
}

#[derive(Debug, Clone)]
pub struct LogisticRegression {
    coef: Array2<f64>,
    intercept: Array1<f64>,
}

struct Objective {
    /// Training features with a trailing column of ones for the intercept.
    design: Array2<f64>,
    targets: Array2<f64>,
    n_features: usize,
    penalty: f64,
}

impl Objective {
    fn loss(&self, params: &Array2<f64>) -> f64 {
        let log_probs = log_softmax(&self.design.dot(params));
        self.data_loss(&log_probs) + self.penalty_loss(params)
    }

    fn loss_and_gradient(&self, params: &Array2<f64>) -> (f64, Array2<f64>) {
        let log_probs = log_softmax(&self.design.dot(params));
        let loss = self.data_loss(&log_probs) + self.penalty_loss(params);

        let rows = self.design.nrows() as f64;
        let residual = (log_probs.mapv(f64::exp) - &self.targets) / rows;
        let mut gradient = self.design.t().dot(&residual);
        gradient
            .slice_mut(s![..self.n_features, ..])
            .scaled_add(self.penalty, &params.slice(s![..self.n_features, ..]));

        (loss, gradient)
    }

    fn data_loss(&self, log_probs: &Array2<f64>) -> f64 {
        -(&self.targets * log_probs).sum() / self.design.nrows() as f64
    }

    fn penalty_loss(&self, params: &Array2<f64>) -> f64 {
        let weights = params.slice(s![..self.n_features, ..]);
        0.5 * self.penalty * weights.mapv(|w| w * w).sum()
    }
}

impl LogisticRegression {
    pub fn fit(
        features: ArrayView2<f64>,
        labels: &[usize],
        n_classes: usize,
        config: &SolverConfig,
    ) -> Result<(Self, FitReport), PipelineError> {
        let (rows, n_features) = features.dim();
        if rows != labels.len() {
            return Err(PipelineError::LabelCountMismatch {
                rows,
                labels: labels.len(),
            });
        }
        if let Some(&label) = labels.iter().find(|&&label| label >= n_classes) {
            return Err(PipelineError::LabelOutOfRange { label, n_classes });
        }

        let mut present = vec![false; n_classes];
        for &label in labels {
            present[label] = true;
        }
        let distinct = present.iter().filter(|&&seen| seen).count();
        if distinct < 2 {
            return Err(PipelineError::TooFewClasses(distinct));
        }

        let mut targets = Array2::zeros((rows, n_classes));
        for (row, &label) in labels.iter().enumerate() {
            targets[[row, label]] = 1.0;
        }

        let mut design = Array2::ones((rows, n_features + 1));
        design.slice_mut(s![.., ..n_features]).assign(&features);

        let objective = Objective {
            design,
            targets,
            n_features,
            penalty: 1.0 / (config.c * rows as f64),
        };

        let mut params = Array2::zeros((n_features + 1, n_classes));
        let mut previous = params.clone();
        let mut momentum = 1.0_f64;
        let mut step = 1.0_f64;
        let (mut loss, mut gradient) = objective.loss_and_gradient(&params);
        let mut converged = max_abs(&gradient) <= config.tolerance;
        let mut iterations = 0;

        while !converged && iterations < config.max_iter {
            iterations += 1;

            let next_momentum = (1.0 + (1.0 + 4.0 * momentum * momentum).sqrt()) / 2.0;
            let beta = (momentum - 1.0) / next_momentum;
            let lookahead = &params + &((&params - &previous) * beta);
            let (lookahead_loss, lookahead_gradient) = objective.loss_and_gradient(&lookahead);
            let gradient_sq = lookahead_gradient.mapv(|g| g * g).sum();

            let mut candidate = &lookahead - &(&lookahead_gradient * step);
            while objective.loss(&candidate) > lookahead_loss - 0.5 * step * gradient_sq
                && step > MIN_STEP
            {
                step *= 0.5;
                candidate = &lookahead - &(&lookahead_gradient * step);
            }

            let (candidate_loss, candidate_gradient) = objective.loss_and_gradient(&candidate);
            if candidate_loss > loss {
                // Momentum overshot; retry from the current point with a plain step.
                momentum = 1.0;
                previous = params.clone();
                continue;
            }

            momentum = next_momentum;
            previous = std::mem::replace(&mut params, candidate);
            loss = candidate_loss;
            gradient = candidate_gradient;
            converged = max_abs(&gradient) <= config.tolerance;
        }

        if converged {
            debug!("Solver converged after {} iterations (loss {:.6})", iterations, loss);
        } else {
            warn!(
                "Solver did not converge within {} iterations (loss {:.6}, max gradient {:.2e}); keeping last parameters",
                config.max_iter,
                loss,
                max_abs(&gradient)
            );
        }

        let model = Self {
            coef: params.slice(s![..n_features, ..]).to_owned(),
            intercept: params.row(n_features).to_owned(),
        };
        let report = FitReport {
            iterations,
            final_loss: loss,
            converged,
        };
        Ok((model, report))
    }

    pub fn n_features(&self) -> usize {
        self.coef.nrows()
    }

    pub fn n_classes(&self) -> usize {
        self.coef.ncols()
    }

    pub fn predict_proba(&self, features: ArrayView2<f64>) -> Result<Array2<f64>, PipelineError> {
        if features.ncols() != self.n_features() {
            return Err(PipelineError::FeatureMismatch {
                expected: self.n_features(),
                actual: features.ncols(),
            });
        }
        let logits = features.dot(&self.coef) + &self.intercept;
        Ok(log_softmax(&logits).mapv(f64::exp))
    }

    pub fn predict_proba_row(&self, row: ArrayView1<f64>) -> Result<Array1<f64>, PipelineError> {
        let probs = self.predict_proba(row.insert_axis(Axis(0)))?;
        Ok(probs.row(0).to_owned())
    }

    pub fn predict(&self, features: ArrayView2<f64>) -> Result<Vec<usize>, PipelineError> {
        let probs = self.predict_proba(features)?;
        Ok(probs.rows().into_iter().map(|row| argmax(row).0).collect())
    }
}

/// Index and value of the largest entry; the first one wins ties.
pub fn argmax(values: ArrayView1<f64>) -> (usize, f64) {
    let mut best = (0, f64::NEG_INFINITY);
    for (index, &value) in values.iter().enumerate() {
        if value > best.1 {
            best = (index, value);
        }
    }
    best
}

fn log_softmax(logits: &Array2<f64>) -> Array2<f64> {
    let mut out = logits.clone();
    for mut row in out.rows_mut() {
        let max = row.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
        let log_sum = max + row.mapv(|v| (v - max).exp()).sum().ln();
        row.mapv_inplace(|v| v - log_sum);
    }
    out
}

fn max_abs(values: &Array2<f64>) -> f64 {
    values.fold(0.0_f64, |acc, &v| acc.max(v.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn clustered_data() -> (Array2<f64>, Vec<usize>) {
        let centers = [(-2.0, 0.0), (2.0, 0.0), (0.0, 3.0)];
        let offsets = [(0.0, 0.0), (0.3, 0.2), (-0.2, 0.3), (0.25, -0.3), (-0.3, -0.1)];
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for (class, (cx, cy)) in centers.iter().enumerate() {
            for (dx, dy) in offsets.iter() {
                rows.push([cx + dx, cy + dy]);
                labels.push(class);
            }
        }
        let flat: Vec<f64> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        (Array2::from_shape_vec((rows.len(), 2), flat).unwrap(), labels)
    }

    #[test]
    fn learns_well_separated_classes() {
        let (x, y) = clustered_data();
        let (model, report) =
            LogisticRegression::fit(x.view(), &y, 3, &SolverConfig::default()).unwrap();

        assert!(report.converged, "report: {report:?}");
        assert!(report.iterations <= 1000);
        assert_eq!(model.predict(x.view()).unwrap(), y);
    }

    #[test]
    fn probabilities_are_normalized() {
        let (x, y) = clustered_data();
        let (model, _) =
            LogisticRegression::fit(x.view(), &y, 3, &SolverConfig::default()).unwrap();
        let probs = model.predict_proba(x.view()).unwrap();

        for row in probs.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
            assert!(row.iter().all(|p| (0.0..=1.0).contains(p)));
        }

        let single = model.predict_proba_row(array![0.0, 3.0].view()).unwrap();
        assert_eq!(argmax(single.view()).0, 2);
    }

    #[test]
    fn hitting_the_iteration_cap_is_not_fatal() {
        let (x, y) = clustered_data();
        let config = SolverConfig {
            max_iter: 1,
            tolerance: 1e-12,
            ..SolverConfig::default()
        };
        let (model, report) = LogisticRegression::fit(x.view(), &y, 3, &config).unwrap();

        assert!(!report.converged);
        assert_eq!(report.iterations, 1);
        assert_eq!(model.n_classes(), 3);
        assert!(report.final_loss < (3.0_f64).ln());
    }

    #[test]
    fn requires_two_classes() {
        let x = array![[0.0], [1.0], [2.0]];
        assert!(matches!(
            LogisticRegression::fit(x.view(), &[1, 1, 1], 3, &SolverConfig::default()),
            Err(PipelineError::TooFewClasses(1))
        ));
    }

    #[test]
    fn validates_label_shape_and_range() {
        let x = array![[0.0], [1.0]];
        assert!(matches!(
            LogisticRegression::fit(x.view(), &[0], 2, &SolverConfig::default()),
            Err(PipelineError::LabelCountMismatch { rows: 2, labels: 1 })
        ));
        assert!(matches!(
            LogisticRegression::fit(x.view(), &[0, 3], 2, &SolverConfig::default()),
            Err(PipelineError::LabelOutOfRange { label: 3, n_classes: 2 })
        ));
    }

    #[test]
    fn rejects_wrong_feature_width_at_prediction() {
        let (x, y) = clustered_data();
        let (model, _) =
            LogisticRegression::fit(x.view(), &y, 3, &SolverConfig::default()).unwrap();
        let wide = array![[1.0, 2.0, 3.0]];
        assert!(matches!(
            model.predict(wide.view()),
            Err(PipelineError::FeatureMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn argmax_prefers_first_on_ties() {
        let values = array![0.4, 0.4, 0.2];
        assert_eq!(argmax(values.view()), (0, 0.4));
    }
}
