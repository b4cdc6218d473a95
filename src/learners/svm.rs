//! Linear support vector machine
//!
//! Trained with mini-batch Pegasos: at step `t` the step size is `1 / (lambda t)`,
//! a batch of `batch_size` random rows contributes the hinge-loss sub-gradient and
//! the weights are projected back onto the ball of radius `1 / sqrt(lambda)`.

use super::cross_validation::cross_validate;
use super::{misclassification, weight_decay, FitState, LabelEncoding, Learner, TrainingSet};
use crate::error::{Result, SearchError};
use crate::search::transform::Transform;
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Pegasos configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvmConfig {
    /// Regularization strength
    pub lambda: f64,
    /// Number of Pegasos steps (T)
    pub epochs: usize,
    /// Rows sampled per step (K)
    pub batch_size: usize,
    /// Random seed
    pub seed: u64,
}

impl Default for SvmConfig {
    fn default() -> Self {
        Self {
            lambda: 0.01,
            epochs: 1000,
            batch_size: 1,
            seed: 42,
        }
    }
}

impl SvmConfig {
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

fn pegasos(set: &TrainingSet, config: &SvmConfig, lambda: f64) -> Result<Array1<f64>> {
    if !(lambda > 0.0) {
        return Err(SearchError::TrainingError(format!("SVM lambda must be positive, got {}", lambda)));
    }
    if config.batch_size == 0 {
        return Err(SearchError::TrainingError("SVM batch size must be positive".to_string()));
    }
    let n = set.len();
    if n == 0 {
        return Err(SearchError::TrainingError("no training rows".to_string()));
    }

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);
    let mut w = Array1::<f64>::zeros(set.x.ncols());
    let radius = 1.0 / lambda.sqrt();

    for t in 1..=config.epochs {
        let eta = 1.0 / (lambda * t as f64);
        let mut step = Array1::<f64>::zeros(w.len());
        for _ in 0..config.batch_size {
            let i = rng.gen_range(0..n);
            let row = set.x.row(i);
            let y = set.y[i];
            if y * row.dot(&w) < 1.0 {
                step.scaled_add(y, &row);
            }
        }

        w *= 1.0 - eta * lambda;
        w.scaled_add(eta / config.batch_size as f64, &step);

        let norm = w.dot(&w).sqrt();
        if norm > radius {
            w *= radius / norm;
        }
        if !w.iter().all(|v| v.is_finite()) {
            return Err(SearchError::ConvergenceError { iterations: t });
        }
    }

    Ok(w)
}

/// Linear SVM on +1/-1 labels.
#[derive(Debug, Clone)]
pub struct Svm {
    config: SvmConfig,
    state: FitState,
    cv_folds: usize,
}

impl Default for Svm {
    fn default() -> Self {
        Self::new(SvmConfig::default())
    }
}

impl Svm {
    pub fn new(config: SvmConfig) -> Self {
        Self {
            config,
            state: FitState::default(),
            cv_folds: 10,
        }
    }

    pub fn with_cv_folds(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }

    pub fn config(&self) -> &SvmConfig {
        &self.config
    }

    pub fn weights(&self) -> Option<&Array1<f64>> {
        self.state.weights.as_ref()
    }

    fn fit(&mut self, lambda: Option<f64>) -> Result<()> {
        let set = self.state.training_set()?;
        let w = pegasos(set, &self.config, lambda.unwrap_or(self.config.lambda))?;
        let ein = misclassification(set, &w);
        self.state.record(w, lambda, ein);
        Ok(())
    }
}

impl Learner for Svm {
    fn initialize_from_data(&mut self, data: &Array2<f64>) -> Result<()> {
        self.state.initialize(data, LabelEncoding::Signed)
    }

    fn set_transform(&mut self, transform: Transform) {
        self.state.set_transform(transform);
    }

    fn apply_transformation(&mut self) -> Result<()> {
        self.state.apply_transformation()
    }

    fn learn(&mut self) -> Result<()> {
        self.fit(None)
    }

    /// Pegasos is regularized already; this replaces its lambda with `10^-k`.
    fn learn_regularized(&mut self, k: i32) -> Result<()> {
        self.fit(Some(weight_decay(k)))
    }

    fn ein(&self) -> f64 {
        self.state.ein
    }

    fn ecv(&self) -> f64 {
        let Ok(set) = self.state.training_set() else {
            return f64::INFINITY;
        };
        let lambda = self.state.lambda.unwrap_or(self.config.lambda);
        cross_validate(set, self.cv_folds, |train| pegasos(train, &self.config, lambda)).mean_error
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        self.state.score(features)
    }
}
