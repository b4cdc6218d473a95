//! Training of a single recipe

use super::container::ModelContainer;
use super::recipe::ModelRecipe;
use crate::data::DataMatrix;
use crate::error::Result;
use crate::learners::{Learner, LearnerConfig, ModelKind, Svm, TrainedModel};
use ndarray::Array2;

/// Builds and fits models from recipes.
#[derive(Debug, Clone, Default)]
pub struct ModelTrainer {
    config: LearnerConfig,
}

impl ModelTrainer {
    pub fn new(config: LearnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    /// Project `data` onto the recipe's features and fit.
    pub fn train(&self, recipe: &ModelRecipe, data: &DataMatrix) -> Result<ModelContainer> {
        let rows = data.filter_with_label(&recipe.features)?;
        let model = self.fit(recipe, &rows)?;
        Ok(ModelContainer::new(model, recipe.clone()))
    }

    /// Fit on rows whose last column is the label:
    /// initialize, transform if asked, then learn with or without weight decay.
    pub fn fit(&self, recipe: &ModelRecipe, rows: &Array2<f64>) -> Result<TrainedModel> {
        let mut model = match (recipe.model_kind, &recipe.svm) {
            (ModelKind::Svm, Some(svm)) => {
                TrainedModel::Svm(Svm::new(svm.clone()).with_cv_folds(self.config.cv_folds))
            }
            (kind, _) => kind.build(&self.config),
        };

        model.initialize_from_data(rows)?;
        if let Some(transform) = recipe.transform()? {
            model.set_transform(transform);
            model.apply_transformation()?;
        }

        if recipe.regularized {
            model.learn_regularized(recipe.k)?;
        } else {
            model.learn()?;
        }
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::learners::SvmConfig;
    use crate::search::transform::TransformCatalog;

    fn data() -> DataMatrix {
        let rows = vec![
            vec![1.0, 0.0, -2.0, 1.0, 0.0],
            vec![2.0, 0.0, -1.0, 2.0, 0.0],
            vec![3.0, 1.0, 1.0, 1.0, 0.0],
            vec![4.0, 1.0, 2.0, 2.0, 0.0],
            vec![5.0, 0.0, -3.0, 1.5, 0.0],
            vec![6.0, 1.0, 3.0, 0.5, 0.0],
        ];
        DataMatrix::from_rows(&rows, Some(1), vec![2, 3, 4]).unwrap()
    }

    #[test]
    fn test_train_each_family() {
        let trainer = ModelTrainer::new(LearnerConfig {
            cv_folds: 3,
            ..Default::default()
        });
        for kind in ModelKind::all() {
            let recipe = ModelRecipe::new(kind, vec![2]);
            let container = trainer.train(&recipe, &data()).unwrap();
            assert_eq!(container.kind(), kind);
            assert_eq!(container.features(), &[2]);
            assert_eq!(container.classify(&[5.0]).unwrap(), 1, "{}", kind);
            assert_eq!(container.classify(&[-5.0]).unwrap(), 0, "{}", kind);
        }
    }

    #[test]
    fn test_transformed_and_regularized() {
        let trainer = ModelTrainer::default();
        let t = TransformCatalog::get(2, 2).unwrap();
        let recipe = ModelRecipe::new(ModelKind::Linreg, vec![2, 3])
            .with_transform(&t)
            .with_regularization(2);
        let container = trainer.train(&recipe, &data()).unwrap();
        assert_eq!(container.transform_dimension(), Some(2));
        assert_eq!(container.transform_id(), Some(2));
        assert_eq!(container.model().weights().unwrap().len(), 4);
    }

    #[test]
    fn test_transform_dimension_mismatch_fails() {
        let trainer = ModelTrainer::default();
        let t = TransformCatalog::get(3, 0).unwrap();
        let recipe = ModelRecipe::new(ModelKind::Linreg, vec![2, 3]).with_transform(&t);
        let err = trainer.train(&recipe, &data()).unwrap_err();
        assert!(matches!(err, SearchError::DimensionMismatch { expected: 3, actual: 2 }));
        assert!(err.is_training_failure());
    }

    #[test]
    fn test_singular_features_fail() {
        let trainer = ModelTrainer::default();
        let recipe = ModelRecipe::new(ModelKind::Linreg, vec![4]);
        let err = trainer.train(&recipe, &data()).unwrap_err();
        assert!(matches!(err, SearchError::SingularMatrix));
    }

    #[test]
    fn test_svm_recipe_parameters_are_used() {
        let trainer = ModelTrainer::default();
        let recipe = ModelRecipe::new(ModelKind::Svm, vec![2]).with_svm(SvmConfig::default().with_batch_size(0));
        assert!(trainer.train(&recipe, &data()).is_err());
    }
}
