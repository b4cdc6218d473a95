//! Kaggle submission files

use super::PredictionWriter;
use crate::error::{Result, SearchError};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Writes `PassengerId,Survived` CSV files into one output directory.
#[derive(Debug, Clone)]
pub struct SubmissionWriter {
    dir: PathBuf,
}

impl SubmissionWriter {
    /// Create the writer, creating `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", name))
    }
}

impl PredictionWriter for SubmissionWriter {
    fn write(&self, name: &str, ids: &[String], predictions: &[u8]) -> Result<()> {
        if ids.len() != predictions.len() {
            return Err(SearchError::ExportError(format!(
                "{}: {} ids for {} predictions",
                name,
                ids.len(),
                predictions.len()
            )));
        }

        let path = self.path_for(name);
        let export_err = |e: &dyn std::fmt::Display| {
            SearchError::ExportError(format!("{}: {}", path.display(), e))
        };

        let survived: Vec<i32> = predictions.iter().map(|&p| p as i32).collect();
        let mut df = DataFrame::new(vec![
            Column::new("PassengerId".into(), ids.to_vec()),
            Column::new("Survived".into(), survived),
        ])
        .map_err(|e| export_err(&e))?;

        let mut file = File::create(&path).map_err(|e| export_err(&e))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)
            .map_err(|e| export_err(&e))?;
        Ok(())
    }
}
