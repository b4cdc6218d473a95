//! Search configuration

use super::transform::TransformCatalog;
use crate::data::columns;
use crate::error::{Result, SearchError};
use crate::learners::{LearnerConfig, ModelKind};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;

/// A hand-picked feature set trained before the combinatorial phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub label: String,
    pub features: Vec<usize>,
}

impl FeatureSet {
    pub fn new(label: impl Into<String>, features: Vec<usize>) -> Self {
        Self {
            label: label.into(),
            features,
        }
    }
}

/// The four classic Titanic feature sets.
pub fn default_feature_sets() -> Vec<FeatureSet> {
    vec![
        FeatureSet::new("sex age", vec![columns::SEX, columns::AGE]),
        FeatureSet::new("pclass age", vec![columns::AGE, columns::PCLASS]),
        FeatureSet::new("pclass sex", vec![columns::SEX, columns::PCLASS]),
        FeatureSet::new(
            "sex age pclass",
            vec![columns::SEX, columns::AGE, columns::PCLASS],
        ),
    ]
}

/// Configuration for one search run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Model families to train
    pub models: Vec<ModelKind>,

    /// Train the hand-picked feature sets
    pub specific: bool,
    pub specific_sets: Vec<FeatureSet>,

    /// Combination sizes for the plain combinatorial phase
    pub combination_sizes: Vec<usize>,

    /// Transform dimensions for the transformed phase (2, 3 or 4)
    pub transform_dimensions: Vec<usize>,

    /// Run the regularization sweep over every trained model
    pub regularize: bool,
    /// Half-open range of regularization exponents, lambda = 10^-k
    pub k_range: (i32, i32),

    /// SVM: train one model per batch size 1..=n instead of the configured one
    pub svm_batch_sweep: Option<usize>,

    /// Keep only the best N models by Ein
    pub top_n: Option<usize>,

    pub learner: LearnerConfig,

    /// Number of parallel jobs (None = rayon default)
    pub n_jobs: Option<usize>,

    /// Stop starting new training jobs after this many seconds
    pub time_budget_secs: Option<u64>,

    /// Write ranking files
    pub rank_ein: bool,
    pub rank_ecv: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            models: vec![ModelKind::Linreg, ModelKind::Logreg],
            specific: true,
            specific_sets: default_feature_sets(),
            combination_sizes: vec![1, 2, 3],
            transform_dimensions: vec![2, 3],
            regularize: false,
            k_range: (-5, 5),
            svm_batch_sweep: None,
            top_n: None,
            learner: LearnerConfig::default(),
            n_jobs: None,
            time_budget_secs: None,
            rank_ein: false,
            rank_ecv: false,
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON configuration. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: SearchConfig = serde_json::from_str(&json)?;
        Ok(config)
    }

    pub fn with_models(mut self, models: Vec<ModelKind>) -> Self {
        self.models = models;
        self
    }

    pub fn with_specific(mut self, specific: bool) -> Self {
        self.specific = specific;
        self
    }

    pub fn with_combination_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.combination_sizes = sizes;
        self
    }

    pub fn with_transform_dimensions(mut self, dimensions: Vec<usize>) -> Self {
        self.transform_dimensions = dimensions;
        self
    }

    pub fn with_regularization(mut self, k_min: i32, k_max: i32) -> Self {
        self.regularize = true;
        self.k_range = (k_min, k_max);
        self
    }

    pub fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    pub fn with_cv_folds(mut self, folds: usize) -> Self {
        self.learner.cv_folds = folds;
        self
    }

    pub fn with_n_jobs(mut self, n_jobs: usize) -> Self {
        self.n_jobs = Some(n_jobs);
        self
    }

    pub fn with_time_budget(mut self, secs: u64) -> Self {
        self.time_budget_secs = Some(secs);
        self
    }

    pub fn k_range(&self) -> Range<i32> {
        self.k_range.0..self.k_range.1
    }

    pub fn validate(&self) -> Result<()> {
        if self.models.is_empty() {
            return Err(SearchError::ConfigError("no model kinds selected".to_string()));
        }
        if self.combination_sizes.contains(&0) {
            return Err(SearchError::ConfigError("combination size must be at least 1".to_string()));
        }
        if let Some(&d) = self
            .transform_dimensions
            .iter()
            .find(|&&d| !TransformCatalog::has_dimension(d))
        {
            return Err(SearchError::ConfigError(format!(
                "no transform catalog for dimension {}, expected one of {:?}",
                d,
                TransformCatalog::DIMENSIONS
            )));
        }
        if self.regularize && self.k_range().is_empty() {
            return Err(SearchError::ConfigError(format!(
                "empty regularization range {}..{}",
                self.k_range.0, self.k_range.1
            )));
        }
        if self.learner.cv_folds < 2 {
            return Err(SearchError::ConfigError("cv_folds must be at least 2".to_string()));
        }
        if !(self.learner.svm.lambda > 0.0) {
            return Err(SearchError::ConfigError("svm lambda must be positive".to_string()));
        }
        if self.learner.svm.batch_size == 0 || self.svm_batch_sweep == Some(0) {
            return Err(SearchError::ConfigError("svm batch size must be positive".to_string()));
        }
        if self.specific_sets.iter().any(|s| s.features.is_empty()) {
            return Err(SearchError::ConfigError("specific feature sets must not be empty".to_string()));
        }
        Ok(())
    }
}
