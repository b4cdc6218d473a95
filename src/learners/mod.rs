//! Learning algorithms used by the search
//!
//! Every family implements [`Learner`], the small contract the search relies on:
//! load labeled rows, optionally expand them with a transform, learn (plain or with
//! weight decay), report in-sample and cross-validation error, and score new rows.
//!
//! - [`LinearRegression`] - least squares through the normal equations
//! - [`LogisticRegression`] - gradient descent on the cross-entropy
//! - [`Svm`] - linear SVM trained with mini-batch Pegasos

mod cross_validation;
mod linear;
mod logistic;
pub(crate) mod solver;
mod svm;

pub use cross_validation::{CVResults, CVSplit, KFold};
pub use linear::LinearRegression;
pub use logistic::{LogisticConfig, LogisticRegression};
pub use svm::{Svm, SvmConfig};

use crate::error::{Result, SearchError};
use crate::search::transform::Transform;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Contract between the search and a learning algorithm.
pub trait Learner: fmt::Debug + Send {
    /// Load labeled rows. The label is the last column; a bias column is prepended.
    fn initialize_from_data(&mut self, data: &Array2<f64>) -> Result<()>;

    /// Register the feature transform used by [`Learner::apply_transformation`] and `predict`.
    fn set_transform(&mut self, transform: Transform);

    /// Expand the loaded rows with the registered transform.
    fn apply_transformation(&mut self) -> Result<()>;

    fn learn(&mut self) -> Result<()>;

    /// Learn with weight decay `lambda = 10^-k`.
    fn learn_regularized(&mut self, k: i32) -> Result<()>;

    /// In-sample error of the last fit. Infinite before any fit.
    fn ein(&self) -> f64;

    /// K-fold cross-validation error. Infinite when it cannot be computed.
    fn ecv(&self) -> f64;

    /// Raw score for a row of (untransformed) feature values. Positive means survived.
    fn predict(&self, features: &[f64]) -> Result<f64>;
}

/// `lambda` for regularization exponent `k`.
pub fn weight_decay(k: i32) -> f64 {
    10f64.powi(-k)
}

/// Learner family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Linreg,
    Logreg,
    Svm,
}

impl ModelKind {
    pub fn all() -> [ModelKind; 3] {
        [ModelKind::Linreg, ModelKind::Logreg, ModelKind::Svm]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Linreg => "linreg",
            ModelKind::Logreg => "logreg",
            ModelKind::Svm => "svm",
        }
    }

    /// Fresh, untrained model of this family.
    pub fn build(&self, config: &LearnerConfig) -> TrainedModel {
        match self {
            ModelKind::Linreg => {
                TrainedModel::Linreg(LinearRegression::new().with_cv_folds(config.cv_folds))
            }
            ModelKind::Logreg => TrainedModel::Logreg(
                LogisticRegression::new(config.logistic.clone()).with_cv_folds(config.cv_folds),
            ),
            ModelKind::Svm => {
                TrainedModel::Svm(Svm::new(config.svm.clone()).with_cv_folds(config.cv_folds))
            }
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "linreg" | "linear" | "linear_regression" => Ok(ModelKind::Linreg),
            "logreg" | "logistic" | "logistic_regression" => Ok(ModelKind::Logreg),
            "svm" => Ok(ModelKind::Svm),
            other => Err(SearchError::ConfigError(format!("unknown model kind '{}'", other))),
        }
    }
}

/// Hyperparameters shared by all learners of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    /// Folds used for `Ecv`
    pub cv_folds: usize,
    pub logistic: LogisticConfig,
    pub svm: SvmConfig,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            cv_folds: 10,
            logistic: LogisticConfig::default(),
            svm: SvmConfig::default(),
        }
    }
}

/// A model of any family. The tag is [`ModelKind`].
#[derive(Debug, Clone)]
pub enum TrainedModel {
    Linreg(LinearRegression),
    Logreg(LogisticRegression),
    Svm(Svm),
}

impl TrainedModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            TrainedModel::Linreg(_) => ModelKind::Linreg,
            TrainedModel::Logreg(_) => ModelKind::Logreg,
            TrainedModel::Svm(_) => ModelKind::Svm,
        }
    }

    pub fn weights(&self) -> Option<&Array1<f64>> {
        match self {
            TrainedModel::Linreg(m) => m.weights(),
            TrainedModel::Logreg(m) => m.weights(),
            TrainedModel::Svm(m) => m.weights(),
        }
    }

    fn learner(&self) -> &dyn Learner {
        match self {
            TrainedModel::Linreg(m) => m,
            TrainedModel::Logreg(m) => m,
            TrainedModel::Svm(m) => m,
        }
    }

    fn learner_mut(&mut self) -> &mut dyn Learner {
        match self {
            TrainedModel::Linreg(m) => m,
            TrainedModel::Logreg(m) => m,
            TrainedModel::Svm(m) => m,
        }
    }
}

impl Learner for TrainedModel {
    fn initialize_from_data(&mut self, data: &Array2<f64>) -> Result<()> {
        self.learner_mut().initialize_from_data(data)
    }

    fn set_transform(&mut self, transform: Transform) {
        self.learner_mut().set_transform(transform)
    }

    fn apply_transformation(&mut self) -> Result<()> {
        self.learner_mut().apply_transformation()
    }

    fn learn(&mut self) -> Result<()> {
        self.learner_mut().learn()
    }

    fn learn_regularized(&mut self, k: i32) -> Result<()> {
        self.learner_mut().learn_regularized(k)
    }

    fn ein(&self) -> f64 {
        self.learner().ein()
    }

    fn ecv(&self) -> f64 {
        self.learner().ecv()
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        self.learner().predict(features)
    }
}

/// How a family wants the 0/1 survival label encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LabelEncoding {
    /// +1 / -1
    Signed,
    /// +1 / 0
    Binary,
}

impl LabelEncoding {
    fn encode(&self, label: f64) -> f64 {
        match (label > 0.5, self) {
            (true, _) => 1.0,
            (false, LabelEncoding::Signed) => -1.0,
            (false, LabelEncoding::Binary) => 0.0,
        }
    }
}

/// Design matrix with a leading bias column, and encoded targets.
#[derive(Debug, Clone)]
pub(crate) struct TrainingSet {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
}

impl TrainingSet {
    fn from_labeled(data: &Array2<f64>, encoding: LabelEncoding) -> Result<Self> {
        if data.ncols() == 0 {
            return Err(SearchError::ShapeError {
                expected: "at least a label column".to_string(),
                actual: "0 columns".to_string(),
            });
        }
        if data.nrows() == 0 {
            return Err(SearchError::TrainingError("no training rows".to_string()));
        }
        let d = data.ncols() - 1;
        let x = Array2::from_shape_fn((data.nrows(), d + 1), |(i, j)| {
            if j == 0 {
                1.0
            } else {
                data[[i, j - 1]]
            }
        });
        let y = data.column(d).mapv(|v| encoding.encode(v));
        Ok(Self { x, y })
    }

    fn transformed(&self, transform: &Transform) -> Result<Self> {
        let rows = self
            .x
            .outer_iter()
            .map(|row| transform.apply(&row.to_vec()))
            .collect::<Result<Vec<_>>>()?;
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let x = Array2::from_shape_vec((self.x.nrows(), width), flat)?;
        Ok(Self { x, y: self.y.clone() })
    }

    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            x: self.x.select(Axis(0), indices),
            y: self.y.select(Axis(0), indices),
        }
    }

    pub fn len(&self) -> usize {
        self.x.nrows()
    }
}

/// Fraction of rows where `score > 0` disagrees with the label. Works for both encodings.
pub(crate) fn misclassification(set: &TrainingSet, w: &Array1<f64>) -> f64 {
    if set.len() == 0 {
        return 0.0;
    }
    let scores = set.x.dot(w);
    let wrong = scores
        .iter()
        .zip(set.y.iter())
        .filter(|(&s, &y)| (s > 0.0) != (y > 0.5))
        .count();
    wrong as f64 / set.len() as f64
}

/// State every learner carries: loaded data, transform and the last fit.
#[derive(Debug, Clone)]
pub(crate) struct FitState {
    data: Option<TrainingSet>,
    transform: Option<Transform>,
    transformed: bool,
    weights: Option<Array1<f64>>,
    lambda: Option<f64>,
    ein: f64,
}

impl Default for FitState {
    fn default() -> Self {
        Self {
            data: None,
            transform: None,
            transformed: false,
            weights: None,
            lambda: None,
            ein: f64::INFINITY,
        }
    }
}

impl FitState {
    fn initialize(&mut self, data: &Array2<f64>, encoding: LabelEncoding) -> Result<()> {
        self.data = Some(TrainingSet::from_labeled(data, encoding)?);
        self.transformed = false;
        self.weights = None;
        self.lambda = None;
        self.ein = f64::INFINITY;
        Ok(())
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = Some(transform);
    }

    fn apply_transformation(&mut self) -> Result<()> {
        if self.transformed {
            return Ok(());
        }
        let (Some(transform), Some(data)) = (self.transform.as_ref(), self.data.as_ref()) else {
            return Ok(());
        };
        self.data = Some(data.transformed(transform)?);
        self.transformed = true;
        Ok(())
    }

    fn training_set(&self) -> Result<&TrainingSet> {
        self.data.as_ref().ok_or(SearchError::ModelNotFitted)
    }

    fn record(&mut self, weights: Array1<f64>, lambda: Option<f64>, ein: f64) {
        self.weights = Some(weights);
        self.lambda = lambda;
        self.ein = ein;
    }

    fn score(&self, features: &[f64]) -> Result<f64> {
        let w = self.weights.as_ref().ok_or(SearchError::ModelNotFitted)?;
        let mut row = Vec::with_capacity(features.len() + 1);
        row.push(1.0);
        row.extend_from_slice(features);
        if let Some(transform) = &self.transform {
            row = transform.apply(&row)?;
        }
        if row.len() != w.len() {
            return Err(SearchError::ShapeError {
                expected: format!("{} inputs", w.len()),
                actual: format!("{} inputs", row.len()),
            });
        }
        Ok(Array1::from(row).dot(w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::transform::TransformCatalog;
    use ndarray::array;

    #[test]
    fn test_training_set_prepends_bias() {
        let data = array![[2.0, 3.0, 1.0], [4.0, 5.0, 0.0]];
        let set = TrainingSet::from_labeled(&data, LabelEncoding::Signed).unwrap();
        assert_eq!(set.x, array![[1.0, 2.0, 3.0], [1.0, 4.0, 5.0]]);
        assert_eq!(set.y, array![1.0, -1.0]);

        let set = TrainingSet::from_labeled(&data, LabelEncoding::Binary).unwrap();
        assert_eq!(set.y, array![1.0, 0.0]);
    }

    #[test]
    fn test_transform_widens_design_matrix() {
        let data = array![[2.0, 3.0, 1.0]];
        let set = TrainingSet::from_labeled(&data, LabelEncoding::Signed).unwrap();
        let t = TransformCatalog::get(2, 2).unwrap();
        let wide = set.transformed(&t).unwrap();
        assert_eq!(wide.x, array![[1.0, 2.0, 3.0, 6.0]]);
    }

    #[test]
    fn test_misclassification() {
        let set = TrainingSet {
            x: array![[1.0, 1.0], [1.0, -1.0], [1.0, 2.0]],
            y: array![1.0, -1.0, -1.0],
        };
        let w = array![0.0, 1.0];
        assert!((misclassification(&set, &w) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_model_kind_parsing() {
        assert_eq!("linreg".parse::<ModelKind>().unwrap(), ModelKind::Linreg);
        assert_eq!("Logistic".parse::<ModelKind>().unwrap(), ModelKind::Logreg);
        assert_eq!("svm".parse::<ModelKind>().unwrap(), ModelKind::Svm);
        assert!("forest".parse::<ModelKind>().is_err());
        assert_eq!(serde_json::to_string(&ModelKind::Logreg).unwrap(), "\"logreg\"");
    }

    #[test]
    fn test_built_model_has_its_kind() {
        let config = LearnerConfig::default();
        for kind in ModelKind::all() {
            assert_eq!(kind.build(&config).kind(), kind);
        }
    }
}
