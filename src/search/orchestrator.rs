//! Search orchestration
//!
//! A run goes through its phases in a fixed order:
//!
//! 1. hand-picked feature sets (optional)
//! 2. every combination of each configured size
//! 3. every combination of size `d` under every transform of the `d` catalog
//! 4. weight-decay sweep over everything trained so far (optional)
//!
//! Each phase enumerates its jobs deterministically and trains them on the rayon
//! pool; results are collected in enumeration order, so a parallel run produces
//! the same population as a sequential one. A job that fails is logged and skipped.

use super::combinations::combinations;
use super::config::SearchConfig;
use super::container::{ModelContainer, ModelPopulation};
use super::recipe::ModelRecipe;
use super::regularization::regularize;
use super::trainer::ModelTrainer;
use super::transform::TransformCatalog;
use crate::data::{DataMatrix, PredictionWriter};
use crate::error::{Result, SearchError};
use crate::learners::ModelKind;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Outcome of the test phase.
#[derive(Debug, Clone, Default)]
pub struct TestReport {
    /// File keys written, in population order
    pub written: Vec<String>,
    /// File keys that could not be predicted or written, with the reason
    pub failed: Vec<(String, String)>,
}

#[derive(Debug)]
pub struct Orchestrator {
    config: SearchConfig,
    trainer: ModelTrainer,
    pool: Option<rayon::ThreadPool>,
    deadline: Option<Instant>,
}

impl Orchestrator {
    /// Validate `config` and prepare the worker pool. The time budget starts now.
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let pool = match config.n_jobs {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SearchError::ConfigError(e.to_string()))?,
            ),
            None => None,
        };
        let deadline = config
            .time_budget_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs));
        Ok(Self {
            trainer: ModelTrainer::new(config.learner.clone()),
            config,
            pool,
            deadline,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn trainer(&self) -> &ModelTrainer {
        &self.trainer
    }

    /// One recipe per SVM batch size when sweeping, otherwise the recipe as is.
    fn with_family_params(&self, recipe: ModelRecipe) -> Vec<ModelRecipe> {
        if recipe.model_kind != ModelKind::Svm {
            return vec![recipe];
        }
        let svm = self.config.learner.svm.clone();
        match self.config.svm_batch_sweep {
            Some(n) => (1..=n)
                .map(|b| recipe.clone().with_svm(svm.clone().with_batch_size(b)))
                .collect(),
            None => vec![recipe.with_svm(svm)],
        }
    }

    pub fn specific_recipes(&self) -> Vec<ModelRecipe> {
        if !self.config.specific {
            return Vec::new();
        }
        self.config
            .models
            .iter()
            .flat_map(|&kind| {
                self.config.specific_sets.iter().flat_map(move |set| {
                    self.with_family_params(
                        ModelRecipe::new(kind, set.features.clone()).with_label(set.label.clone()),
                    )
                })
            })
            .collect()
    }

    pub fn combinatorial_recipes(&self, data: &DataMatrix) -> Vec<ModelRecipe> {
        let mut recipes = Vec::new();
        for &size in &self.config.combination_sizes {
            for &kind in &self.config.models {
                for combo in combinations(data.features(), size) {
                    recipes.extend(self.with_family_params(ModelRecipe::new(kind, combo)));
                }
            }
        }
        recipes
    }

    pub fn transformed_recipes(&self, data: &DataMatrix) -> Vec<ModelRecipe> {
        let mut recipes = Vec::new();
        for &dimension in &self.config.transform_dimensions {
            for &kind in &self.config.models {
                for combo in combinations(data.features(), dimension) {
                    for transform in TransformCatalog::for_dimension(dimension) {
                        let recipe = ModelRecipe::new(kind, combo.clone()).with_transform(transform);
                        recipes.extend(self.with_family_params(recipe));
                    }
                }
            }
        }
        recipes
    }

    pub fn build_specific(&self, data: &DataMatrix) -> ModelPopulation {
        self.train_all("specific", &self.specific_recipes(), data)
    }

    pub fn build_combinatorial(&self, data: &DataMatrix) -> ModelPopulation {
        self.train_all("combinatorial", &self.combinatorial_recipes(data), data)
    }

    pub fn build_transformed(&self, data: &DataMatrix) -> ModelPopulation {
        self.train_all("transformed", &self.transformed_recipes(data), data)
    }

    /// Best-by-Ein regularized variant of every model that has one.
    pub fn regularize_all(&self, data: &DataMatrix, population: &ModelPopulation) -> ModelPopulation {
        let k_range = self.config.k_range();
        let variants: Vec<ModelContainer> = self.install(|| {
            population
                .as_slice()
                .par_iter()
                .filter_map(|container| regularize(&self.trainer, data, container, k_range.clone()))
                .collect()
        });
        info!(
            phase = "regularize",
            candidates = population.len(),
            improved = variants.len(),
            "phase complete"
        );
        variants.into()
    }

    /// Full search over `data`. Fails with [`SearchError::NoModelsFound`] if nothing trained.
    pub fn run(&self, data: &DataMatrix) -> Result<ModelPopulation> {
        if data.label_column().is_none() {
            return Err(SearchError::MissingLabel);
        }

        let mut population = ModelPopulation::new();
        population.append(&mut self.build_specific(data));
        population.append(&mut self.build_combinatorial(data));
        population.append(&mut self.build_transformed(data));

        if self.config.regularize {
            let mut variants = self.regularize_all(data, &population);
            population.append(&mut variants);
        }

        self.finish(population)
    }

    /// Retrain imported recipes without searching.
    pub fn retrain(&self, recipes: &[ModelRecipe], data: &DataMatrix) -> Result<ModelPopulation> {
        if data.label_column().is_none() {
            return Err(SearchError::MissingLabel);
        }
        let population = self.train_all("retrain", recipes, data);
        self.finish(population)
    }

    fn finish(&self, mut population: ModelPopulation) -> Result<ModelPopulation> {
        if population.is_empty() {
            return Err(SearchError::NoModelsFound);
        }
        if let Some(n) = self.config.top_n {
            population.sort_by_ein();
            population.truncate(n);
        }
        info!(models = population.len(), "search complete");
        Ok(population)
    }

    /// 0/1 predictions of `container` for every row of `data`.
    pub fn predict(&self, container: &ModelContainer, data: &DataMatrix) -> Result<Vec<u8>> {
        let rows = data.filter(container.features())?;
        rows.outer_iter()
            .map(|row| container.classify(&row.to_vec()))
            .collect()
    }

    /// Predict `data` with every model and hand each result to `writer`.
    ///
    /// Failures are collected in the report; the population stays usable.
    pub fn test(
        &self,
        population: &ModelPopulation,
        data: &DataMatrix,
        writer: &dyn PredictionWriter,
    ) -> TestReport {
        let outcomes: Vec<(String, Result<()>)> = self.install(|| {
            population
                .as_slice()
                .par_iter()
                .map(|container| {
                    let key = container.file_stem();
                    let outcome = self
                        .predict(container, data)
                        .and_then(|predictions| writer.write(&key, data.ids(), &predictions));
                    (key, outcome)
                })
                .collect()
        });

        let mut report = TestReport::default();
        for (key, outcome) in outcomes {
            match outcome {
                Ok(()) => report.written.push(key),
                Err(err) => {
                    warn!(model = %key, error = %err, "could not write predictions");
                    report.failed.push((key, err.to_string()));
                }
            }
        }
        info!(written = report.written.len(), failed = report.failed.len(), "test phase complete");
        report
    }

    fn train_all(&self, phase: &str, recipes: &[ModelRecipe], data: &DataMatrix) -> ModelPopulation {
        let expired = AtomicBool::new(false);
        let trained: Vec<ModelContainer> = self.install(|| {
            recipes
                .par_iter()
                .filter_map(|recipe| {
                    if self.deadline.is_some_and(|d| Instant::now() >= d) {
                        if !expired.swap(true, Ordering::Relaxed) {
                            warn!(phase, "time budget exhausted, skipping remaining jobs");
                        }
                        return None;
                    }
                    match self.trainer.train(recipe, data) {
                        Ok(container) => Some(container),
                        Err(err) if err.is_training_failure() => {
                            debug!(phase, model = %recipe.name(), error = %err, "training failed");
                            None
                        }
                        Err(err) => {
                            warn!(phase, model = %recipe.name(), error = %err, "skipping model");
                            None
                        }
                    }
                })
                .collect()
        });
        info!(phase, attempted = recipes.len(), trained = trained.len(), "phase complete");
        trained.into()
    }

    fn install<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}
