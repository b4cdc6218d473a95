//! Linear regression used as a classifier

use super::cross_validation::cross_validate;
use super::solver::solve_normal_equations;
use super::{misclassification, weight_decay, FitState, LabelEncoding, Learner};
use crate::error::Result;
use crate::search::transform::Transform;
use ndarray::{Array1, Array2};

/// Least squares on +1/-1 labels, classified by the sign of the score.
///
/// `learn_regularized(k)` adds weight decay `10^-k` to the normal equations.
#[derive(Debug, Clone)]
pub struct LinearRegression {
    state: FitState,
    cv_folds: usize,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    pub fn new() -> Self {
        Self {
            state: FitState::default(),
            cv_folds: 10,
        }
    }

    pub fn with_cv_folds(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }

    pub fn weights(&self) -> Option<&Array1<f64>> {
        self.state.weights.as_ref()
    }

    /// Weight decay of the last fit, `None` if it was not regularized.
    pub fn lambda(&self) -> Option<f64> {
        self.state.lambda
    }

    fn fit(&mut self, lambda: Option<f64>) -> Result<()> {
        let set = self.state.training_set()?;
        let w = solve_normal_equations(&set.x, &set.y, lambda.unwrap_or(0.0))?;
        let ein = misclassification(set, &w);
        self.state.record(w, lambda, ein);
        Ok(())
    }
}

impl Learner for LinearRegression {
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
            solve_normal_equations(&train.x, &train.y, lambda)
        })
        .mean_error
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        self.state.score(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::search::transform::TransformCatalog;
    use ndarray::array;

    fn separable() -> Array2<f64> {
        // label = 1 when x > 0
        array![
            [-3.0, 0.0],
            [-2.0, 0.0],
            [-1.0, 0.0],
            [1.0, 1.0],
            [2.0, 1.0],
            [3.0, 1.0],
        ]
    }

    #[test]
    fn test_linear_regression_separates() {
        let mut model = LinearRegression::new().with_cv_folds(3);
        model.initialize_from_data(&separable()).unwrap();
        model.learn().unwrap();

        assert_eq!(model.ein(), 0.0);
        assert!(model.predict(&[5.0]).unwrap() > 0.0);
        assert!(model.predict(&[-5.0]).unwrap() < 0.0);
        assert_eq!(model.weights().unwrap().len(), 2);
        assert!(model.ecv() <= 0.5);
    }

    #[test]
    fn test_ein_before_fit_is_infinite() {
        let model = LinearRegression::new();
        assert!(model.ein().is_infinite());
        assert!(model.ecv().is_infinite());
        assert!(matches!(model.predict(&[1.0]), Err(SearchError::ModelNotFitted)));
    }

    #[test]
    fn test_singular_design_fails() {
        let data = array![[0.0, 1.0], [0.0, 0.0], [0.0, 1.0]];
        let mut model = LinearRegression::new();
        model.initialize_from_data(&data).unwrap();
        assert!(matches!(model.learn(), Err(SearchError::SingularMatrix)));
    }

    #[test]
    fn test_regularized_fit_records_lambda() {
        let mut model = LinearRegression::new();
        model.initialize_from_data(&separable()).unwrap();
        model.learn_regularized(2).unwrap();
        assert!((model.lambda().unwrap() - 0.01).abs() < 1e-15);
        assert_eq!(model.ein(), 0.0);
    }

    #[test]
    fn test_transformed_prediction() {
        let data = array![
            [1.0, 1.0, 1.0],
            [-1.0, -1.0, 1.0],
            [1.0, -1.0, 0.0],
            [-1.0, 1.0, 0.0],
            [2.0, 2.0, 1.0],
            [-2.0, 2.0, 0.0],
        ];
        let mut model = LinearRegression::new().with_cv_folds(2);
        model.initialize_from_data(&data).unwrap();
        model.set_transform(TransformCatalog::get(2, 2).unwrap());
        model.apply_transformation().unwrap();
        model.learn().unwrap();

        assert_eq!(model.weights().unwrap().len(), 4);
        assert!(model.predict(&[3.0, 3.0]).unwrap() > 0.0);
        assert!(model.predict(&[3.0, -3.0]).unwrap() < 0.0);
        assert!(matches!(
            model.predict(&[3.0]),
            Err(SearchError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_transform_dimension_mismatch_on_apply() {
        let mut model = LinearRegression::new();
        model.initialize_from_data(&separable()).unwrap();
        model.set_transform(TransformCatalog::get(3, 0).unwrap());
        assert!(matches!(
            model.apply_transformation(),
            Err(SearchError::DimensionMismatch { expected: 3, actual: 1 })
        ));
    }
}
