//! Kaggle passenger CSV loading

use super::passenger::{to_matrix, Passenger};
use super::{DataMatrix, DataReader};
use crate::error::{Result, SearchError};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads `train.csv` / `test.csv` style files into an encoded [`DataMatrix`].
#[derive(Debug, Clone)]
pub struct PassengerReader {
    path: PathBuf,
    labeled: bool,
}

impl PassengerReader {
    /// Reader for a training file. It must carry a `Survived` column.
    pub fn train(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), labeled: true }
    }

    /// Reader for a test file. `Survived` is ignored if present.
    pub fn test(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), labeled: false }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the raw passenger records.
    pub fn passengers(&self) -> Result<Vec<Passenger>> {
        let file = File::open(&self.path)?;
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(1000))
            .into_reader_with_file_handle(file)
            .finish()?;

        let ids = str_column(&df, "PassengerId")?;
        let survived = if self.labeled {
            Some(f64_column(&df, "Survived")?)
        } else {
            None
        };
        let pclass = f64_column(&df, "Pclass")?;
        let names = str_column(&df, "Name")?;
        let sex = str_column(&df, "Sex")?;
        let age = f64_column(&df, "Age")?;
        let sibsp = f64_column(&df, "SibSp")?;
        let parch = f64_column(&df, "Parch")?;
        let ticket = str_column(&df, "Ticket")?;
        let fare = f64_column(&df, "Fare")?;
        let cabin = str_column(&df, "Cabin")?;
        let embarked = str_column(&df, "Embarked")?;

        if let Some(i) = survived.as_ref().and_then(|s| s.iter().position(Option::is_none)) {
            return Err(SearchError::DataError(format!(
                "missing Survived value for passenger {} (row {})",
                ids[i].as_deref().unwrap_or("?"),
                i + 1
            )));
        }

        let passengers: Vec<Passenger> = (0..df.height())
            .map(|i| Passenger {
                id: ids[i].clone().unwrap_or_default(),
                survived: survived.as_ref().map(|s| s[i].is_some_and(|v| v > 0.5)),
                pclass: pclass[i].map(|v| v as i64),
                name: names[i].clone().unwrap_or_default(),
                sex: sex[i].clone().unwrap_or_default(),
                age: age[i],
                sibsp: sibsp[i].map(|v| v as i64),
                parch: parch[i].map(|v| v as i64),
                ticket: ticket[i].clone().unwrap_or_default(),
                fare: fare[i],
                cabin: cabin[i].clone().unwrap_or_default(),
                embarked: embarked[i].clone().unwrap_or_default(),
            })
            .collect();

        debug!(path = %self.path.display(), rows = passengers.len(), "read passengers");
        Ok(passengers)
    }
}

impl DataReader for PassengerReader {
    fn read(&self) -> Result<DataMatrix> {
        let passengers = self.passengers()?;
        to_matrix(&passengers, self.labeled)
    }
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| SearchError::DataError(format!("column '{}' not found", name)))
}

/// Numeric column; unparsable cells become `None`.
fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let values = column(df, name)?.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().collect())
}

fn str_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let values = column(df, name)?.cast(&DataType::String)?;
    Ok(values
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}
