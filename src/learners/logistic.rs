//! Logistic regression trained with batch gradient descent

use super::cross_validation::cross_validate;
use super::{misclassification, weight_decay, FitState, LabelEncoding, Learner, TrainingSet};
use crate::error::{Result, SearchError};
use crate::search::transform::Transform;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Gradient descent settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticConfig {
    pub learning_rate: f64,
    pub max_epochs: usize,
    /// Stop once the gradient norm drops below this
    pub tolerance: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_epochs: 1000,
            tolerance: 1e-6,
        }
    }
}

/// Logistic regression on +1/0 labels. The score is the log-odds.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    config: LogisticConfig,
    state: FitState,
    cv_folds: usize,
    epochs: usize,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(LogisticConfig::default())
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Mean cross-entropy of `w` on `set`.
fn cross_entropy(set: &TrainingSet, w: &Array1<f64>) -> f64 {
    if set.len() == 0 {
        return 0.0;
    }
    let eps = 1e-15;
    let total: f64 = set
        .x
        .dot(w)
        .iter()
        .zip(set.y.iter())
        .map(|(&z, &y)| {
            let p = sigmoid(z).clamp(eps, 1.0 - eps);
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum();
    total / set.len() as f64
}

/// Returns the weights and the number of epochs run.
fn gradient_descent(set: &TrainingSet, config: &LogisticConfig, lambda: f64) -> Result<(Array1<f64>, usize)> {
    let n = set.len() as f64;
    let mut w = Array1::<f64>::zeros(set.x.ncols());

    for epoch in 1..=config.max_epochs {
        let residual = set.x.dot(&w).mapv(sigmoid) - &set.y;
        let mut gradient = set.x.t().dot(&residual) / n;
        if lambda > 0.0 {
            gradient.scaled_add(lambda, &w);
        }

        w.scaled_add(-config.learning_rate, &gradient);
        if !w.iter().all(|v| v.is_finite()) {
            return Err(SearchError::ConvergenceError { iterations: epoch });
        }
        if gradient.dot(&gradient).sqrt() < config.tolerance {
            return Ok((w, epoch));
        }
    }

    Ok((w, config.max_epochs))
}

impl LogisticRegression {
    pub fn new(config: LogisticConfig) -> Self {
        Self {
            config,
            state: FitState::default(),
            cv_folds: 10,
            epochs: 0,
        }
    }

    pub fn with_cv_folds(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }

    pub fn weights(&self) -> Option<&Array1<f64>> {
        self.state.weights.as_ref()
    }

    /// Epochs run by the last fit.
    pub fn epochs(&self) -> usize {
        self.epochs
    }

    /// Mean cross-entropy of the fitted weights on the training data.
    pub fn training_loss(&self) -> Option<f64> {
        let set = self.state.training_set().ok()?;
        self.state.weights.as_ref().map(|w| cross_entropy(set, w))
    }

    /// Survival probability for a row of feature values.
    pub fn predict_proba(&self, features: &[f64]) -> Result<f64> {
        Ok(sigmoid(self.state.score(features)?))
    }

    fn fit(&mut self, lambda: Option<f64>) -> Result<()> {
        let set = self.state.training_set()?;
        let (w, epochs) = gradient_descent(set, &self.config, lambda.unwrap_or(0.0))?;
        let ein = misclassification(set, &w);
        self.state.record(w, lambda, ein);
        self.epochs = epochs;
        Ok(())
    }
}

impl Learner for LogisticRegression {
    fn initialize_from_data(&mut self, data: &Array2<f64>) -> Result<()> {
        self.epochs = 0;
        self.state.initialize(data, LabelEncoding::Binary)
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
        let lambda = self.state.lambda.unwrap_or(0.0);
        cross_validate(set, self.cv_folds, |train| {
            gradient_descent(train, &self.config, lambda).map(|(w, _)| w)
        })
        .mean_error
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        self.state.score(features)
    }
}
