//! Weight-decay sweep over a trained model

use super::container::ModelContainer;
use super::trainer::ModelTrainer;
use crate::data::DataMatrix;
use std::ops::Range;
use tracing::debug;

/// Retrain `container` with weight decay `10^-k` for every `k` in `k_range` and keep
/// the variant with the lowest `Ein`.
///
/// Returns `None` unless that variant beats the unregularized model.
pub fn regularize(
    trainer: &ModelTrainer,
    data: &DataMatrix,
    container: &ModelContainer,
    k_range: Range<i32>,
) -> Option<ModelContainer> {
    let mut best: Option<ModelContainer> = None;
    let mut best_ein = container.ein();

    for k in k_range {
        let recipe = container.recipe().clone().with_regularization(k);
        match trainer.train(&recipe, data) {
            Ok(candidate) => {
                if candidate.ein() < best_ein {
                    best_ein = candidate.ein();
                    best = Some(candidate);
                }
            }
            Err(err) => debug!(model = %recipe.name(), error = %err, "regularized fit failed"),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learners::{LearnerConfig, ModelKind};
    use crate::search::recipe::ModelRecipe;

    #[test]
    fn test_no_improvement_returns_none() {
        // already perfect in sample, nothing can beat Ein = 0
        let rows = vec![
            vec![-2.0, 0.0],
            vec![-1.0, 0.0],
            vec![1.0, 1.0],
            vec![2.0, 1.0],
        ];
        let data = DataMatrix::from_rows(&rows, Some(1), vec![0]).unwrap();
        let trainer = ModelTrainer::new(LearnerConfig::default());
        let base = trainer.train(&ModelRecipe::new(ModelKind::Linreg, vec![0]), &data).unwrap();
        assert_eq!(base.ein(), 0.0);
        assert!(regularize(&trainer, &data, &base, -2..3).is_none());
    }

    #[test]
    fn test_improvement_is_kept() {
        // heavy decay pulls the boundary past the negatives, lighter decay separates them
        let rows: Vec<Vec<f64>> = [(1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (10.0, 1.0), (11.0, 1.0), (12.0, 1.0), (13.0, 1.0)]
            .iter()
            .map(|&(x, y)| vec![x, y])
            .collect();
        let data = DataMatrix::from_rows(&rows, Some(1), vec![0]).unwrap();
        let trainer = ModelTrainer::new(LearnerConfig::default());
        let poor = trainer
            .train(&ModelRecipe::new(ModelKind::Linreg, vec![0]).with_regularization(-3), &data)
            .unwrap();
        assert!((poor.ein() - 3.0 / 7.0).abs() < 1e-12);

        let better = regularize(&trainer, &data, &poor, 0..3).unwrap();
        assert_eq!(better.ein(), 0.0);
        assert!(better.recipe().regularized);
        // k = 1 and k = 2 only tie with k = 0
        assert_eq!(better.recipe().k, 0);
        assert!(better.name().contains("regularized k"));
    }

    #[test]
    fn test_logreg_variants_compare_by_mistakes() {
        let rows = vec![
            vec![-2.0, 0.0],
            vec![-1.0, 0.0],
            vec![1.0, 1.0],
            vec![2.0, 1.0],
        ];
        let data = DataMatrix::from_rows(&rows, Some(1), vec![0]).unwrap();
        let trainer = ModelTrainer::new(LearnerConfig::default());
        let base = trainer.train(&ModelRecipe::new(ModelKind::Logreg, vec![0]), &data).unwrap();
        // decay changes the loss, never the zero mistake count
        assert_eq!(base.ein(), 0.0);
        assert!(regularize(&trainer, &data, &base, -1..3).is_none());
    }

    #[test]
    fn test_empty_range() {
        let rows = vec![vec![-1.0, 0.0], vec![1.0, 1.0], vec![2.0, 1.0]];
        let data = DataMatrix::from_rows(&rows, Some(1), vec![0]).unwrap();
        let trainer = ModelTrainer::default();
        let base = trainer.train(&ModelRecipe::new(ModelKind::Logreg, vec![0]), &data).unwrap();
        assert!(regularize(&trainer, &data, &base, 0..0).is_none());
    }
}
