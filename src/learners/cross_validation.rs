//! Cross-validation folds and the `Ecv` estimate

use super::{misclassification, TrainingSet};
use crate::error::{Result, SearchError};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// One held-out fold and the rows trained on around it
#[derive(Debug, Clone)]
pub struct CVSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// Contiguous k-fold splitter. Rows keep their order; the first `n % k` folds
/// take one extra row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KFold {
    n_splits: usize,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits }
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    pub fn split(&self, n_samples: usize) -> Result<Vec<CVSplit>> {
        let k = self.n_splits;
        if k < 2 {
            return Err(SearchError::ConfigError(format!("k-fold needs at least 2 folds, got {}", k)));
        }
        if n_samples < k {
            return Err(SearchError::ConfigError(format!(
                "cannot split {} rows into {} folds",
                n_samples, k
            )));
        }

        let mut start = 0;
        let splits = (0..k)
            .map(|fold_idx| {
                let end = start + n_samples / k + usize::from(fold_idx < n_samples % k);
                let split = CVSplit {
                    train_indices: (0..start).chain(end..n_samples).collect(),
                    test_indices: (start..end).collect(),
                    fold_idx,
                };
                start = end;
                split
            })
            .collect();
        Ok(splits)
    }
}

/// Per-fold errors of one cross-validation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CVResults {
    pub fold_errors: Vec<f64>,
    /// Infinite when no fold could be fitted
    pub mean_error: f64,
}

impl CVResults {
    pub fn from_errors(fold_errors: Vec<f64>) -> Self {
        let mean_error = if fold_errors.is_empty() {
            f64::INFINITY
        } else {
            fold_errors.iter().sum::<f64>() / fold_errors.len() as f64
        };
        Self { fold_errors, mean_error }
    }
}

/// K-fold misclassification estimate. `fit` learns weights on a training fold;
/// folds it cannot fit are left out.
pub(crate) fn cross_validate<F>(set: &TrainingSet, cv_folds: usize, fit: F) -> CVResults
where
    F: Fn(&TrainingSet) -> Result<Array1<f64>>,
{
    let n_splits = cv_folds.min(set.len());
    let splits = match KFold::new(n_splits).split(set.len()) {
        Ok(splits) => splits,
        Err(_) => return CVResults::from_errors(Vec::new()),
    };

    let errors = splits
        .iter()
        .filter_map(|split| {
            let train = set.select(&split.train_indices);
            let held_out = set.select(&split.test_indices);
            fit(&train).ok().map(|w| misclassification(&held_out, &w))
        })
        .collect();

    CVResults::from_errors(errors)
}
