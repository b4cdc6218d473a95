//! Passenger data: the numeric matrix the search runs on, plus its readers and writers
//!
//! The search engine only ever sees a [`DataMatrix`]. Where it comes from and where
//! predictions go are the two seams below: [`DataReader`] and [`PredictionWriter`].

pub mod loader;
pub mod passenger;
pub mod writer;

pub use loader::PassengerReader;
pub use passenger::{columns, Passenger, CANDIDATE_FEATURES};
pub use writer::SubmissionWriter;

use crate::error::{Result, SearchError};
use ndarray::Array2;

/// Numeric data matrix, one row per record.
///
/// `label` is the column holding the target, `features` the candidate feature
/// columns the search may combine. Both are indices into the same row layout.
#[derive(Debug, Clone)]
pub struct DataMatrix {
    values: Array2<f64>,
    label: Option<usize>,
    features: Vec<usize>,
    ids: Vec<String>,
}

impl DataMatrix {
    /// Build a matrix, checking every declared column against its width.
    pub fn new(values: Array2<f64>, label: Option<usize>, features: Vec<usize>) -> Result<Self> {
        let width = values.ncols();
        for &index in label.iter().chain(features.iter()) {
            if index >= width {
                return Err(SearchError::IndexOutOfRange { index, width });
            }
        }
        let ids = (1..=values.nrows()).map(|i| i.to_string()).collect();
        Ok(Self { values, label, features, ids })
    }

    /// Build a matrix from plain rows. All rows must have the same width.
    pub fn from_rows(rows: &[Vec<f64>], label: Option<usize>, features: Vec<usize>) -> Result<Self> {
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(SearchError::ShapeError {
                expected: format!("rows of width {}", width),
                actual: format!("row of width {}", bad.len()),
            });
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let values = Array2::from_shape_vec((rows.len(), width), flat)?;
        Self::new(values, label, features)
    }

    /// Attach record identifiers used when writing predictions.
    pub fn with_ids(mut self, ids: Vec<String>) -> Result<Self> {
        if ids.len() != self.values.nrows() {
            return Err(SearchError::ShapeError {
                expected: format!("{} ids", self.values.nrows()),
                actual: format!("{} ids", ids.len()),
            });
        }
        self.ids = ids;
        Ok(self)
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn label_column(&self) -> Option<usize> {
        self.label
    }

    /// Candidate feature columns.
    pub fn features(&self) -> &[usize] {
        &self.features
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }
}

/// Source of a [`DataMatrix`].
pub trait DataReader {
    fn read(&self) -> Result<DataMatrix>;
}

/// Sink for per-model 0/1 predictions.
pub trait PredictionWriter: Sync {
    /// Write one prediction file keyed by `name`. `ids` and `predictions` are aligned.
    fn write(&self, name: &str, ids: &[String], predictions: &[u8]) -> Result<()>;
}
