//! Binary logistic regression over sparse count features.
//!
//! Trained by full-batch gradient descent with an L2 penalty on the weights
//! (not the intercept). Training is deterministic: the same features, labels
//! and configuration always produce bit-identical parameters.

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SardonicError};
use crate::ml::vectorizer::SparseVector;

/// Probability at or above which a text is predicted `true`.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Gradient descent hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticRegressionConfig {
    /// Step size.
    pub learning_rate: f64,
    /// Upper bound on full passes over the training set.
    pub max_iter: usize,
    /// Stop once the log-loss improves by less than this.
    pub tolerance: f64,
    /// L2 penalty strength.
    pub l2: f64,
}

impl Default for LogisticRegressionConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.5,
            max_iter: 500,
            tolerance: 1e-6,
            l2: 1e-4,
        }
    }
}

impl LogisticRegressionConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(SardonicError::invalid_config(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.max_iter == 0 {
            return Err(SardonicError::invalid_config("max_iter must be at least 1"));
        }
        if self.tolerance.is_nan() || self.tolerance < 0.0 {
            return Err(SardonicError::invalid_config(format!(
                "tolerance must be non-negative, got {}",
                self.tolerance
            )));
        }
        if !(self.l2.is_finite() && self.l2 >= 0.0) {
            return Err(SardonicError::invalid_config(format!(
                "l2 must be non-negative, got {}",
                self.l2
            )));
        }
        Ok(())
    }
}

/// Fitted classifier parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: Vec<f64>,
    intercept: f64,
    iterations: usize,
    loss: f64,
}

impl LogisticRegression {
    /// Fit on `features` with matching `labels`.
    ///
    /// Every feature vector must share one dimension; that dimension becomes
    /// the classifier's input size.
    pub fn fit(
        config: &LogisticRegressionConfig,
        features: &[SparseVector],
        labels: &[bool],
    ) -> Result<Self> {
        config.validate()?;

        if features.is_empty() {
            return Err(SardonicError::InsufficientTrainingData {
                min_samples: 1,
                actual: 0,
            });
        }
        if features.len() != labels.len() {
            return Err(SardonicError::corpus(format!(
                "{} feature vectors but {} labels",
                features.len(),
                labels.len()
            )));
        }

        let n_features = features[0].dim();
        if let Some(bad) = features.iter().find(|x| x.dim() != n_features) {
            return Err(SardonicError::DimensionMismatch {
                expected: n_features,
                actual: bad.dim(),
            });
        }

        let n = features.len() as f64;
        let targets: Vec<f64> = labels.iter().map(|&y| if y { 1.0 } else { 0.0 }).collect();

        let mut weights = vec![0.0; n_features];
        let mut intercept = 0.0;
        let mut previous_loss = f64::INFINITY;
        let mut loss = f64::INFINITY;
        let mut iterations = 0;

        for iter in 0..config.max_iter {
            iterations = iter + 1;

            let probabilities: Vec<f64> = features
                .par_iter()
                .map(|x| sigmoid(x.dot(&weights) + intercept))
                .collect();

            loss = log_loss(&targets, &probabilities)
                + 0.5 * config.l2 * weights.iter().map(|w| w * w).sum::<f64>();

            // Sequential accumulation keeps the floating-point sums reproducible.
            let mut grad_w: Vec<f64> = weights.iter().map(|w| config.l2 * w).collect();
            let mut grad_b = 0.0;
            for ((x, p), y) in features.iter().zip(&probabilities).zip(&targets) {
                let error = (p - y) / n;
                grad_b += error;
                for (i, v) in x.entries() {
                    grad_w[*i] += error * v;
                }
            }

            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= config.learning_rate * g;
            }
            intercept -= config.learning_rate * grad_b;

            if (previous_loss - loss).abs() < config.tolerance {
                debug!("Converged after {iterations} iterations (loss {loss:.6})");
                break;
            }
            previous_loss = loss;
        }

        debug!("Trained on {} samples x {n_features} features, final loss {loss:.6}", features.len());

        Ok(LogisticRegression {
            weights,
            intercept,
            iterations,
            loss,
        })
    }

    /// Input dimension.
    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Gradient descent iterations actually run.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Regularized log-loss at the last iteration.
    pub fn loss(&self) -> f64 {
        self.loss
    }

    /// Probability of `true` for one vector.
    pub fn probability(&self, x: &SparseVector) -> Result<f64> {
        if x.dim() != self.n_features() {
            return Err(SardonicError::DimensionMismatch {
                expected: self.n_features(),
                actual: x.dim(),
            });
        }
        Ok(sigmoid(x.dot(&self.weights) + self.intercept))
    }

    /// Probability of `true` for each vector, in order.
    pub fn predict_proba(&self, features: &[SparseVector]) -> Result<Vec<f64>> {
        features.par_iter().map(|x| self.probability(x)).collect()
    }

    /// Predicted label for each vector, in order.
    pub fn predict(&self, features: &[SparseVector]) -> Result<Vec<bool>> {
        Ok(self
            .predict_proba(features)?
            .into_iter()
            .map(|p| p >= DECISION_THRESHOLD)
            .collect())
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let exp_z = z.exp();
        exp_z / (1.0 + exp_z)
    }
}

fn log_loss(targets: &[f64], probabilities: &[f64]) -> f64 {
    let eps = 1e-15;
    let total: f64 = targets
        .iter()
        .zip(probabilities)
        .map(|(y, p)| {
            let p = p.clamp(eps, 1.0 - eps);
            y * p.ln() + (1.0 - y) * (1.0 - p).ln()
        })
        .sum();
    -total / targets.len() as f64
}
