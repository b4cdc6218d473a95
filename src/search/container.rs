//! Trained models and populations of them

use super::recipe::{file_stem, ModelRecipe};
use crate::error::Result;
use crate::learners::{Learner, ModelKind, TrainedModel};
use rayon::prelude::*;
use std::sync::OnceLock;

/// A trained model with the metadata needed to name, rank and reuse it.
#[derive(Debug, Clone)]
pub struct ModelContainer {
    model: TrainedModel,
    name: String,
    recipe: ModelRecipe,
    ecv: OnceLock<f64>,
}

impl ModelContainer {
    pub fn new(model: TrainedModel, recipe: ModelRecipe) -> Self {
        Self {
            model,
            name: recipe.name(),
            recipe,
            ecv: OnceLock::new(),
        }
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name usable as a file name.
    pub fn file_stem(&self) -> String {
        file_stem(&self.name)
    }

    pub fn recipe(&self) -> &ModelRecipe {
        &self.recipe
    }

    pub fn kind(&self) -> ModelKind {
        self.recipe.model_kind
    }

    /// Data columns the model was trained on, in order.
    pub fn features(&self) -> &[usize] {
        &self.recipe.features
    }

    pub fn transform_dimension(&self) -> Option<usize> {
        self.recipe.transform_dimension
    }

    pub fn transform_id(&self) -> Option<usize> {
        self.recipe.transform_id
    }

    pub fn ein(&self) -> f64 {
        self.model.ein()
    }

    /// Cross-validation error, computed on first use.
    pub fn ecv(&self) -> f64 {
        *self.ecv.get_or_init(|| self.model.ecv())
    }

    /// 0/1 survival prediction for a row of this model's features.
    pub fn classify(&self, features: &[f64]) -> Result<u8> {
        Ok(u8::from(self.model.predict(features)? > 0.0))
    }
}

/// Ordered collection of trained models.
#[derive(Debug, Clone, Default)]
pub struct ModelPopulation {
    models: Vec<ModelContainer>,
}

impl ModelPopulation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModelContainer> {
        self.models.iter()
    }

    pub fn as_slice(&self) -> &[ModelContainer] {
        &self.models
    }

    pub fn get(&self, index: usize) -> Option<&ModelContainer> {
        self.models.get(index)
    }

    pub fn push(&mut self, container: ModelContainer) {
        self.models.push(container);
    }

    /// Move every model of `other` to the end of this population.
    pub fn append(&mut self, other: &mut ModelPopulation) {
        self.models.append(&mut other.models);
    }

    /// Stable sort, lowest in-sample error first.
    pub fn sort_by_ein(&mut self) {
        self.models.sort_by(|a, b| a.ein().total_cmp(&b.ein()));
    }

    /// Stable sort, lowest cross-validation error first.
    pub fn sort_by_ecv(&mut self) {
        self.models.par_iter().for_each(|m| {
            m.ecv();
        });
        self.models.sort_by(|a, b| a.ecv().total_cmp(&b.ecv()));
    }

    /// The first `min(n, len)` models in current order.
    pub fn top_n(&self, n: usize) -> &[ModelContainer] {
        &self.models[..n.min(self.models.len())]
    }

    pub fn truncate(&mut self, n: usize) {
        self.models.truncate(n);
    }

    pub fn names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name()).collect()
    }

    pub fn into_vec(self) -> Vec<ModelContainer> {
        self.models
    }
}

impl From<Vec<ModelContainer>> for ModelPopulation {
    fn from(models: Vec<ModelContainer>) -> Self {
        Self { models }
    }
}

impl FromIterator<ModelContainer> for ModelPopulation {
    fn from_iter<I: IntoIterator<Item = ModelContainer>>(iter: I) -> Self {
        Self {
            models: iter.into_iter().collect(),
        }
    }
}

impl Extend<ModelContainer> for ModelPopulation {
    fn extend<I: IntoIterator<Item = ModelContainer>>(&mut self, iter: I) {
        self.models.extend(iter);
    }
}

impl IntoIterator for ModelPopulation {
    type Item = ModelContainer;
    type IntoIter = std::vec::IntoIter<ModelContainer>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.into_iter()
    }
}

impl<'a> IntoIterator for &'a ModelPopulation {
    type Item = &'a ModelContainer;
    type IntoIter = std::slice::Iter<'a, ModelContainer>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learners::LearnerConfig;
    use ndarray::{array, Array2};

    /// Linreg on one feature with the first `wrong` labels flipped.
    fn container(wrong: usize, tag: &str) -> ModelContainer {
        let mut data: Array2<f64> = array![[-2.0, 0.0], [-1.0, 0.0], [1.0, 1.0], [2.0, 1.0]];
        for i in 0..wrong {
            data[[i, 1]] = 1.0 - data[[i, 1]];
        }
        let mut model = ModelKind::Linreg.build(&LearnerConfig::default());
        model.initialize_from_data(&data).unwrap();
        model.learn().unwrap();
        ModelContainer::new(model, ModelRecipe::new(ModelKind::Linreg, vec![0]).with_label(tag))
    }

    #[test]
    fn test_container_metadata() {
        let c = container(0, "a");
        assert_eq!(c.name(), "linreg a [0]");
        assert_eq!(c.file_stem(), "linreg_a_0");
        assert_eq!(c.features(), &[0]);
        assert_eq!(c.kind(), ModelKind::Linreg);
        assert_eq!(c.transform_dimension(), None);
        assert_eq!(c.ein(), 0.0);
        assert_eq!(c.classify(&[3.0]).unwrap(), 1);
        assert_eq!(c.classify(&[-3.0]).unwrap(), 0);
    }

    #[test]
    fn test_sort_by_ein_is_stable() {
        let mut population: ModelPopulation = vec![
            container(0, "first"),
            container(0, "second"),
            container(0, "third"),
        ]
        .into();
        let before = population.names().iter().map(|s| s.to_string()).collect::<Vec<_>>();
        population.sort_by_ein();
        assert_eq!(population.names(), before);
    }

    #[test]
    fn test_top_n() {
        let mut population = ModelPopulation::new();
        population.push(container(0, "a"));
        population.push(container(0, "b"));

        assert_eq!(population.top_n(5).len(), 2);
        assert_eq!(population.top_n(1).len(), 1);
        assert!(population.top_n(0).is_empty());
    }

    #[test]
    fn test_top_n_is_prefix_of_full_sort() {
        let unsorted: ModelPopulation = [2, 0, 1, 0, 2, 1]
            .iter()
            .enumerate()
            .map(|(i, &w)| container(w, &format!("m{}", i)))
            .collect();
        let mut sorted = unsorted.clone();
        sorted.sort_by_ein();
        let order: Vec<String> = sorted.names().iter().map(|s| s.to_string()).collect();
        assert_ne!(order, unsorted.names());

        for n in 0..=unsorted.len() {
            let mut kept = unsorted.clone();
            kept.sort_by_ein();
            kept.truncate(n);
            assert_eq!(kept.names(), order[..n].to_vec(), "n = {}", n);
            assert_eq!(
                sorted.top_n(n).iter().map(|m| m.name()).collect::<Vec<_>>(),
                order[..n].to_vec()
            );
            let worst_kept = kept.iter().map(|m| m.ein()).fold(f64::NEG_INFINITY, f64::max);
            assert!(sorted.as_slice()[n..].iter().all(|m| m.ein() >= worst_kept));
        }
    }

    #[test]
    fn test_append_keeps_order() {
        let mut a: ModelPopulation = vec![container(0, "a")].into();
        let mut b: ModelPopulation = vec![container(0, "b"), container(0, "c")].into();
        a.append(&mut b);
        assert!(b.is_empty());
        assert_eq!(a.names(), vec!["linreg a [0]", "linreg b [0]", "linreg c [0]"]);
    }

    #[test]
    fn test_sorted_errors_are_non_decreasing() {
        let mut population: ModelPopulation = (0..4).map(|w| container(w % 3, "m")).collect();
        population.sort_by_ein();
        let eins: Vec<f64> = population.top_n(3).iter().map(|m| m.ein()).collect();
        assert!(eins.windows(2).all(|w| w[0] <= w[1]), "{:?}", eins);

        population.sort_by_ecv();
        let ecvs: Vec<f64> = population.iter().map(|m| m.ecv()).collect();
        assert!(ecvs.windows(2).all(|w| w[0] <= w[1]), "{:?}", ecvs);
    }
}
