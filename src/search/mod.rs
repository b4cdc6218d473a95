//! Combinatorial model search
//!
//! Recipes describe what to train, the [`ModelTrainer`] turns a recipe into a
//! [`ModelContainer`], and the [`Orchestrator`] enumerates recipes phase by phase
//! and collects the results into a [`ModelPopulation`].

pub mod combinations;
pub mod config;
pub mod container;
pub mod orchestrator;
pub mod projector;
pub mod ranking;
pub mod recipe;
pub mod regularization;
pub mod trainer;
pub mod transform;

pub use combinations::{combinations, count, Combinations};
pub use config::{default_feature_sets, FeatureSet, SearchConfig};
pub use container::{ModelContainer, ModelPopulation};
pub use orchestrator::{Orchestrator, TestReport};
pub use ranking::{render_ranking, write_ranking, RankMetric};
pub use recipe::{export_recipes, file_stem, import_recipes, ModelRecipe};
pub use regularization::regularize;
pub use trainer::ModelTrainer;
pub use transform::{Transform, TransformCatalog};
