//! Passenger records and their numeric encoding

use super::DataMatrix;
use crate::error::Result;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Column layout of the encoded passenger matrix. Train and test share it.
pub mod columns {
    pub const ID: usize = 0;
    pub const SURVIVED: usize = 1;
    pub const PCLASS: usize = 2;
    pub const SEX: usize = 3;
    pub const AGE: usize = 4;
    pub const SIBSP: usize = 5;
    pub const PARCH: usize = 6;
    pub const FARE: usize = 7;
    pub const EMBARKED: usize = 8;
    pub const HAS_CABIN: usize = 9;
    pub const FAMILY_SIZE: usize = 10;
    pub const IS_CHILD: usize = 11;

    pub const WIDTH: usize = 12;

    /// Human readable column names, indexed by column.
    pub const NAMES: [&str; WIDTH] = [
        "id",
        "survived",
        "pclass",
        "sex",
        "age",
        "sibsp",
        "parch",
        "fare",
        "embarked",
        "has_cabin",
        "family_size",
        "is_child",
    ];
}

/// Columns the search is allowed to combine.
pub const CANDIDATE_FEATURES: [usize; 10] = [
    columns::PCLASS,
    columns::SEX,
    columns::AGE,
    columns::SIBSP,
    columns::PARCH,
    columns::FARE,
    columns::EMBARKED,
    columns::HAS_CABIN,
    columns::FAMILY_SIZE,
    columns::IS_CHILD,
];

pub const DEFAULT_AGE: f64 = 25.0;
pub const DEFAULT_PCLASS: f64 = 3.0;
const CHILD_AGE: f64 = 16.0;

/// One row of the Kaggle passenger files, as read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Passenger {
    pub id: String,
    /// `None` in the test file.
    pub survived: Option<bool>,
    pub pclass: Option<i64>,
    pub name: String,
    pub sex: String,
    pub age: Option<f64>,
    pub sibsp: Option<i64>,
    pub parch: Option<i64>,
    pub ticket: String,
    pub fare: Option<f64>,
    pub cabin: String,
    pub embarked: String,
}

impl Passenger {
    pub fn is_female(&self) -> bool {
        self.sex.trim().eq_ignore_ascii_case("female")
    }

    /// Port of embarkation: C = 0, Q = 1, S = 2, unknown = 0.
    pub fn embarked_code(&self) -> f64 {
        match self.embarked.trim() {
            "Q" => 1.0,
            "S" => 2.0,
            _ => 0.0,
        }
    }

    /// Encode into a numeric row following [`columns`], filling gaps with defaults.
    pub fn to_row(&self) -> Vec<f64> {
        let age = self.age.filter(|a| a.is_finite()).unwrap_or(DEFAULT_AGE);
        let sibsp = self.sibsp.unwrap_or(0) as f64;
        let parch = self.parch.unwrap_or(0) as f64;

        let mut row = vec![0.0; columns::WIDTH];
        row[columns::ID] = self.id.trim().parse().unwrap_or(0.0);
        row[columns::SURVIVED] = if self.survived == Some(true) { 1.0 } else { 0.0 };
        row[columns::PCLASS] = self.pclass.map(|p| p as f64).unwrap_or(DEFAULT_PCLASS);
        row[columns::SEX] = if self.is_female() { 1.0 } else { 0.0 };
        row[columns::AGE] = age;
        row[columns::SIBSP] = sibsp;
        row[columns::PARCH] = parch;
        row[columns::FARE] = self.fare.filter(|f| f.is_finite()).unwrap_or(0.0);
        row[columns::EMBARKED] = self.embarked_code();
        row[columns::HAS_CABIN] = if self.cabin.trim().is_empty() { 0.0 } else { 1.0 };
        row[columns::FAMILY_SIZE] = sibsp + parch + 1.0;
        row[columns::IS_CHILD] = if age < CHILD_AGE { 1.0 } else { 0.0 };
        row
    }
}

/// Encode passengers into a [`DataMatrix`]. `labeled` marks the survival column as the label.
pub fn to_matrix(passengers: &[Passenger], labeled: bool) -> Result<DataMatrix> {
    let flat: Vec<f64> = passengers.iter().flat_map(|p| p.to_row()).collect();
    let values = Array2::from_shape_vec((passengers.len(), columns::WIDTH), flat)?;
    let label = labeled.then_some(columns::SURVIVED);
    let ids = passengers.iter().map(|p| p.id.clone()).collect();
    DataMatrix::new(values, label, CANDIDATE_FEATURES.to_vec())?.with_ids(ids)
}
