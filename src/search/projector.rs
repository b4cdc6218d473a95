//! Column projection of a data matrix

use crate::data::DataMatrix;
use crate::error::{Result, SearchError};
use ndarray::{Array2, Axis};

fn check_columns(matrix: &DataMatrix, columns: &[usize]) -> Result<()> {
    let width = matrix.ncols();
    match columns.iter().find(|&&c| c >= width) {
        Some(&index) => Err(SearchError::IndexOutOfRange { index, width }),
        None => Ok(()),
    }
}

impl DataMatrix {
    /// Keep only `keep`, in the order given.
    pub fn filter(&self, keep: &[usize]) -> Result<Array2<f64>> {
        check_columns(self, keep)?;
        Ok(self.values().select(Axis(1), keep))
    }

    /// Keep `keep` and append the label as the last column.
    pub fn filter_with_label(&self, keep: &[usize]) -> Result<Array2<f64>> {
        let label = self.label_column().ok_or(SearchError::MissingLabel)?;
        let mut columns = Vec::with_capacity(keep.len() + 1);
        columns.extend_from_slice(keep);
        columns.push(label);
        check_columns(self, &columns)?;
        Ok(self.values().select(Axis(1), &columns))
    }
}
