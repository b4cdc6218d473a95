//! Titanic model search
//!
//! Trains a large population of small binary classifiers over every combination of
//! passenger features, optionally under fixed non-linear feature transforms and with
//! weight decay, then ranks them by in-sample and cross-validation error and writes
//! one submission file per model.
//!
//! # Modules
//!
//! - [`data`] - Passenger CSV loading, the numeric data matrix, submission writing
//! - [`learners`] - Linear regression, logistic regression and Pegasos SVM
//! - [`search`] - Recipes, transforms, the orchestrator, rankings
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

pub mod data;
pub mod learners;
pub mod search;

// Services
pub mod cli;

pub use error::{Result, SearchError};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{Result, SearchError};

    // Data
    pub use crate::data::{columns, DataMatrix, DataReader, PassengerReader, PredictionWriter, SubmissionWriter};

    // Learners
    pub use crate::learners::{Learner, LearnerConfig, ModelKind, SvmConfig, TrainedModel};

    // Search
    pub use crate::search::{
        export_recipes, import_recipes, write_ranking, ModelContainer, ModelPopulation, ModelRecipe,
        Orchestrator, RankMetric, SearchConfig, TestReport, Transform, TransformCatalog,
    };
}
