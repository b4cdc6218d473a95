//! Non-linear feature transforms
//!
//! A transform takes a design row `[1, x1, .., xd]` (bias placeholder first) and
//! returns `[1, x1, .., xd, extra terms..]`. Catalogs exist for `d` in `{2, 3, 4}`;
//! a transform is identified by its dimension and its position in the catalog.

use crate::error::{Result, SearchError};
use std::fmt;

type ExpandFn = fn(&[f64]) -> Vec<f64>;

/// One entry of a transform catalog.
#[derive(Clone, Copy)]
pub struct Transform {
    dimension: usize,
    id: usize,
    description: &'static str,
    expand: ExpandFn,
}

impl Transform {
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// The extra terms appended, e.g. `x1*x2, |x1+x2|`.
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Expand a design row. The row must hold the bias slot plus `dimension` features.
    pub fn apply(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.dimension + 1 {
            return Err(SearchError::DimensionMismatch {
                expected: self.dimension,
                actual: row.len().saturating_sub(1),
            });
        }
        Ok((self.expand)(row))
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("dimension", &self.dimension)
            .field("id", &self.id)
            .field("description", &self.description)
            .finish()
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        self.dimension == other.dimension && self.id == other.id
    }
}

impl Eq for Transform {}

/// Lookup of the fixed transform catalogs.
pub struct TransformCatalog;

impl TransformCatalog {
    /// Dimensions that have a catalog.
    pub const DIMENSIONS: [usize; 3] = [2, 3, 4];

    /// All transforms for `dimension`, in catalog order. Empty for other dimensions.
    pub fn for_dimension(dimension: usize) -> &'static [Transform] {
        match dimension {
            2 => &CATALOG_2D,
            3 => &CATALOG_3D,
            4 => &CATALOG_4D,
            _ => &[],
        }
    }

    pub fn get(dimension: usize, id: usize) -> Option<Transform> {
        Self::for_dimension(dimension).get(id).copied()
    }

    pub fn has_dimension(dimension: usize) -> bool {
        Self::DIMENSIONS.contains(&dimension)
    }
}

macro_rules! catalog {
    ($dim:expr; $( $id:expr => $desc:expr, $f:path );* $(;)?) => {
        [ $( Transform { dimension: $dim, id: $id, description: $desc, expand: $f } ),* ]
    };
}

static CATALOG_2D: [Transform; 7] = catalog![2;
    0 => "|x1+x2|", abs_sum;
    1 => "|x1-x2|", abs_difference;
    2 => "x1*x2", product;
    3 => "x1*x2, |x1+x2|", product_abs_sum;
    4 => "x1*x2, |x1-x2|", product_abs_difference;
    5 => "x1^2+x2^2", square_sum;
    6 => "x1*x2, x1^2+x2^2", product_square_sum;
];

static CATALOG_3D: [Transform; 7] = catalog![3;
    0 => "|x1+x2+x3|", abs_sum;
    1 => "|x1-x2-x3|", abs_difference;
    2 => "x1*x2*x3", product;
    3 => "x1*x2*x3, |x1+x2+x3|", product_abs_sum;
    4 => "x1*x2*x3, |x1-x2-x3|", product_abs_difference;
    5 => "x1^2+x2^2+x3^2", square_sum;
    6 => "x1*x2*x3, x1^2+x2^2+x3^2", product_square_sum;
];

static CATALOG_4D: [Transform; 8] = catalog![4;
    0 => "|x1+x2+x3+x4|", abs_sum;
    1 => "|x1-x2-x3-x4|", abs_difference;
    2 => "x1*x2*x3*x4", product;
    3 => "x1*x2*x3*x4, |x1+x2+x3+x4|", product_abs_sum;
    4 => "x1*x2*x3*x4, |x1-x2-x3-x4|", product_abs_difference;
    5 => "x1^2+x2^2+x3^2+x4^2", square_sum;
    6 => "x1*x2*x3*x4, x1^2+x2^2+x3^2+x4^2", product_square_sum;
    7 => "pairwise products and absolute sums", pairwise_interactions;
];

/// `[1, x.., extra..]`
fn extend(row: &[f64], extra: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(row.len() + extra.len());
    out.push(1.0);
    out.extend_from_slice(&row[1..]);
    out.extend_from_slice(extra);
    out
}

fn sum(row: &[f64]) -> f64 {
    row[1..].iter().sum()
}

/// `x1 - x2 - .. - xd`
fn difference(row: &[f64]) -> f64 {
    row[1] - row[2..].iter().sum::<f64>()
}

fn prod(row: &[f64]) -> f64 {
    row[1..].iter().product()
}

fn squares(row: &[f64]) -> f64 {
    row[1..].iter().map(|x| x * x).sum()
}

fn abs_sum(row: &[f64]) -> Vec<f64> {
    extend(row, &[sum(row).abs()])
}

fn abs_difference(row: &[f64]) -> Vec<f64> {
    extend(row, &[difference(row).abs()])
}

fn product(row: &[f64]) -> Vec<f64> {
    extend(row, &[prod(row)])
}

fn product_abs_sum(row: &[f64]) -> Vec<f64> {
    extend(row, &[prod(row), sum(row).abs()])
}

fn product_abs_difference(row: &[f64]) -> Vec<f64> {
    extend(row, &[prod(row), difference(row).abs()])
}

fn square_sum(row: &[f64]) -> Vec<f64> {
    extend(row, &[squares(row)])
}

fn product_square_sum(row: &[f64]) -> Vec<f64> {
    extend(row, &[prod(row), squares(row)])
}

fn pairwise_interactions(row: &[f64]) -> Vec<f64> {
    let (x1, x2, x3, x4) = (row[1], row[2], row[3], row[4]);
    extend(
        row,
        &[
            x1 * x2,
            x3 * x4,
            x1 * x3,
            x2 * x4,
            x1 * x2 * x3 * x4,
            (x1 + x2).abs(),
            (x3 + x4).abs(),
            (x1 + x3).abs(),
            (x2 + x4).abs(),
            (x1 + x2 + x3 + x4).abs(),
        ],
    )
}
