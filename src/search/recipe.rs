//! Model recipes: everything needed to rebuild and retrain a model
//!
//! Recipes are what gets exported to JSON. A recipe file is an array of
//! `{modelKind, transformDimension, transformID, features, regularized, k}` objects,
//! with optional `label` and `svm` entries for specific and SVM models.

use super::container::ModelPopulation;
use super::transform::{Transform, TransformCatalog};
use crate::error::{Result, SearchError};
use crate::learners::{ModelKind, SvmConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecipe {
    pub model_kind: ModelKind,
    #[serde(default)]
    pub transform_dimension: Option<usize>,
    #[serde(rename = "transformID", default)]
    pub transform_id: Option<usize>,
    pub features: Vec<usize>,
    #[serde(default)]
    pub regularized: bool,
    #[serde(default)]
    pub k: i32,
    /// Human tag for hand-picked feature sets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svm: Option<SvmConfig>,
}

impl ModelRecipe {
    pub fn new(model_kind: ModelKind, features: Vec<usize>) -> Self {
        Self {
            model_kind,
            transform_dimension: None,
            transform_id: None,
            features,
            regularized: false,
            k: 0,
            label: None,
            svm: None,
        }
    }

    pub fn with_transform(mut self, transform: &Transform) -> Self {
        self.transform_dimension = Some(transform.dimension());
        self.transform_id = Some(transform.id());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_svm(mut self, svm: SvmConfig) -> Self {
        self.svm = Some(svm);
        self
    }

    /// Same recipe, learned with weight decay `10^-k`.
    pub fn with_regularization(mut self, k: i32) -> Self {
        self.regularized = true;
        self.k = k;
        self
    }

    /// Resolve the catalog transform, if the recipe names one.
    pub fn transform(&self) -> Result<Option<Transform>> {
        match (self.transform_dimension, self.transform_id) {
            (None, None) => Ok(None),
            (Some(d), Some(id)) => TransformCatalog::get(d, id).map(Some).ok_or_else(|| {
                SearchError::ConfigError(format!("no transform {} in the {}D catalog", id, d))
            }),
            _ => Err(SearchError::ConfigError(
                "transform dimension and id must be given together".to_string(),
            )),
        }
    }

    /// Deterministic, human readable name.
    ///
    /// `logreg 3D transformed 2 [2, 3, 4] regularized k 5`
    pub fn name(&self) -> String {
        let mut name = self.model_kind.as_str().to_string();
        if let Some(label) = &self.label {
            name.push(' ');
            name.push_str(label);
        }
        if let (Some(d), Some(id)) = (self.transform_dimension, self.transform_id) {
            name.push_str(&format!(" {}D transformed {}", d, id));
        }
        name.push_str(&format!(" {:?}", self.features));
        if self.regularized {
            name.push_str(&format!(" regularized k {}", self.k));
        }
        if let Some(svm) = &self.svm {
            name.push_str(&format!(
                " svm L {} T {} batch {}",
                svm.lambda, svm.epochs, svm.batch_size
            ));
        }
        name
    }
}

/// Filesystem-safe key derived from a model name.
pub fn file_stem(name: &str) -> String {
    name.replace(", ", "-").replace(['[', ']'], "").replace(' ', "_")
}

/// Write the recipes of a population as a JSON array.
pub fn export_recipes(population: &ModelPopulation, path: &Path) -> Result<()> {
    let recipes: Vec<&ModelRecipe> = population.iter().map(|c| c.recipe()).collect();
    let json = serde_json::to_string_pretty(&recipes)?;
    std::fs::write(path, json)
        .map_err(|e| SearchError::ExportError(format!("{}: {}", path.display(), e)))?;
    info!(path = %path.display(), models = recipes.len(), "exported model recipes");
    Ok(())
}

/// Read recipes written by [`export_recipes`].
pub fn import_recipes(path: &Path) -> Result<Vec<ModelRecipe>> {
    let json = std::fs::read_to_string(path)?;
    let recipes: Vec<ModelRecipe> = serde_json::from_str(&json)?;
    info!(path = %path.display(), models = recipes.len(), "imported model recipes");
    Ok(recipes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_encodes_everything() {
        let t = TransformCatalog::get(3, 2).unwrap();
        let recipe = ModelRecipe::new(ModelKind::Logreg, vec![2, 3, 4])
            .with_transform(&t)
            .with_regularization(5);
        assert_eq!(recipe.name(), "logreg 3D transformed 2 [2, 3, 4] regularized k 5");

        let plain = ModelRecipe::new(ModelKind::Linreg, vec![3]);
        assert_eq!(plain.name(), "linreg [3]");

        let svm = ModelRecipe::new(ModelKind::Svm, vec![3, 4])
            .with_svm(SvmConfig::default().with_batch_size(2));
        assert_eq!(svm.name(), "svm [3, 4] svm L 0.01 T 1000 batch 2");

        let specific = ModelRecipe::new(ModelKind::Linreg, vec![3, 4]).with_label("sex age");
        assert_eq!(specific.name(), "linreg sex age [3, 4]");
    }

    #[test]
    fn test_names_differ_across_hyperparameters() {
        let base = ModelRecipe::new(ModelKind::Linreg, vec![2, 3]);
        let names = vec![
            base.name(),
            base.clone().with_regularization(1).name(),
            base.clone().with_regularization(-1).name(),
            base.clone().with_transform(&TransformCatalog::get(2, 0).unwrap()).name(),
            base.clone().with_transform(&TransformCatalog::get(2, 1).unwrap()).name(),
            ModelRecipe::new(ModelKind::Logreg, vec![2, 3]).name(),
            ModelRecipe::new(ModelKind::Linreg, vec![23]).name(),
        ];
        let mut stems: Vec<String> = names.iter().map(|n| file_stem(n)).collect();
        stems.sort();
        stems.dedup();
        assert_eq!(stems.len(), names.len());
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(
            file_stem("logreg 3D transformed 2 [2, 3, 4] regularized k -5"),
            "logreg_3D_transformed_2_2-3-4_regularized_k_-5"
        );
    }

    #[test]
    fn test_json_shape() {
        let t = TransformCatalog::get(4, 7).unwrap();
        let recipe = ModelRecipe::new(ModelKind::Linreg, vec![2, 3, 4, 5])
            .with_transform(&t)
            .with_regularization(3);
        let value = serde_json::to_value(&recipe).unwrap();
        assert_eq!(value["modelKind"], "linreg");
        assert_eq!(value["transformDimension"], 4);
        assert_eq!(value["transformID"], 7);
        assert_eq!(value["regularized"], true);
        assert_eq!(value["k"], 3);
        assert!(value.get("svm").is_none());

        let back: ModelRecipe = serde_json::from_value(value).unwrap();
        assert_eq!(back, recipe);
    }

    #[test]
    fn test_minimal_json_is_accepted() {
        let recipe: ModelRecipe =
            serde_json::from_str(r#"{"modelKind": "logreg", "features": [3, 4]}"#).unwrap();
        assert_eq!(recipe.model_kind, ModelKind::Logreg);
        assert!(!recipe.regularized);
        assert_eq!(recipe.transform().unwrap(), None);
    }

    #[test]
    fn test_unknown_transform() {
        let mut recipe = ModelRecipe::new(ModelKind::Linreg, vec![2, 3]);
        recipe.transform_dimension = Some(2);
        recipe.transform_id = Some(40);
        assert!(matches!(recipe.transform(), Err(SearchError::ConfigError(_))));

        recipe.transform_id = None;
        assert!(recipe.transform().is_err());
    }
}
