//! Linear operators returned as map derivatives
use crate::numeric::check_len;
use crate::types::{Error, Result};
use rlst::{rlst_dynamic_array2, DynamicArray, RawAccess, RawAccessMut, Shape};
use std::fmt;
use std::sync::Arc;

/// Row table of a selection operator
///
/// Row `i` picks input entry `rows[i]`, or is zero when `rows[i]` is `None`.
/// Every source column is checked against `n_cols` on construction.
#[derive(Debug, Clone)]
pub struct Selection {
    n_cols: usize,
    rows: Arc<[Option<usize>]>,
}

impl Selection {
    /// Create a row table, checking that every source column exists
    pub fn new(n_cols: usize, rows: Vec<Option<usize>>) -> Result<Self> {
        if let Some(bad) = rows.iter().flatten().find(|c| **c >= n_cols) {
            return Err(Error::Configuration(format!(
                "Selection refers to column {bad} of an operator with {n_cols} columns"
            )));
        }
        Ok(Self {
            n_cols,
            rows: rows.into(),
        })
    }

    /// Number of columns
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Source column of every row
    pub fn rows(&self) -> &[Option<usize>] {
        &self.rows
    }

    /// Pick the entries of `x`
    pub fn gather(&self, x: &[f64]) -> Vec<f64> {
        self.rows.iter().map(|r| r.map_or(0.0, |c| x[c])).collect()
    }
}

/// A linear operator supporting products with itself and its adjoint
///
/// Identity, diagonal and replication structures are kept implicit, only
/// [`LinearOperator::Dense`] stores its entries.
pub enum LinearOperator {
    /// Identity of the given size
    Identity(usize),
    /// Diagonal matrix
    Diagonal(Vec<f64>),
    /// Dense matrix stored column-major
    Dense(Arc<DynamicArray<f64, 2>>),
    /// Rows picking single input entries
    Selection(Selection),
    /// Product of operators, applied first to last
    Chain(Vec<LinearOperator>),
}

impl LinearOperator {
    /// Wrap a dense matrix
    pub fn dense(matrix: DynamicArray<f64, 2>) -> Self {
        LinearOperator::Dense(Arc::new(matrix))
    }

    /// Build a selection operator, checking that every source column exists
    pub fn selection(n_cols: usize, rows: Vec<Option<usize>>) -> Result<Self> {
        Ok(LinearOperator::Selection(Selection::new(n_cols, rows)?))
    }

    /// Build the product of `ops`, applied first to last
    pub fn chain(ops: Vec<LinearOperator>) -> Result<Self> {
        if ops.is_empty() {
            return Err(Error::Configuration(
                "Cannot chain an empty list of operators".to_string(),
            ));
        }
        for (index, pair) in ops.windows(2).enumerate() {
            let [rows, _] = pair[0].shape();
            let [_, cols] = pair[1].shape();
            if rows != cols {
                return Err(Error::Configuration(format!(
                    "Operator {index} has {rows} rows but operator {} has {cols} columns",
                    index + 1
                )));
            }
        }
        Ok(LinearOperator::Chain(ops))
    }

    /// Number of rows and columns
    pub fn shape(&self) -> [usize; 2] {
        match self {
            LinearOperator::Identity(n) => [*n, *n],
            LinearOperator::Diagonal(d) => [d.len(), d.len()],
            LinearOperator::Dense(a) => a.shape(),
            LinearOperator::Selection(s) => [s.rows.len(), s.n_cols],
            LinearOperator::Chain(ops) => match (ops.first(), ops.last()) {
                (Some(first), Some(last)) => [last.shape()[0], first.shape()[1]],
                _ => [0, 0],
            },
        }
    }

    /// Compute `A x`
    pub fn apply(&self, x: &[f64]) -> Result<Vec<f64>> {
        let [nrows, ncols] = self.shape();
        check_len(self.kind(), ncols, x)?;
        let y = match self {
            LinearOperator::Identity(_) => x.to_vec(),
            LinearOperator::Diagonal(d) => d.iter().zip(x.iter()).map(|(a, b)| a * b).collect(),
            LinearOperator::Dense(a) => {
                let mut y = vec![0.0; nrows];
                if nrows > 0 {
                    for (column, xj) in a.data().chunks_exact(nrows).zip(x.iter()) {
                        for (yi, aij) in y.iter_mut().zip(column.iter()) {
                            *yi += aij * xj;
                        }
                    }
                }
                y
            }
            LinearOperator::Selection(s) => s.gather(x),
            LinearOperator::Chain(ops) => {
                let mut v = x.to_vec();
                for op in ops {
                    v = op.apply(&v)?;
                }
                v
            }
        };
        Ok(y)
    }

    /// Compute `A^T y`
    pub fn apply_adjoint(&self, y: &[f64]) -> Result<Vec<f64>> {
        let [nrows, ncols] = self.shape();
        check_len(self.kind(), nrows, y)?;
        let x = match self {
            LinearOperator::Identity(_) | LinearOperator::Diagonal(_) => self.apply(y)?,
            LinearOperator::Dense(a) => {
                if nrows == 0 {
                    vec![0.0; ncols]
                } else {
                    a.data()
                        .chunks_exact(nrows)
                        .map(|column| crate::numeric::dot(column, y))
                        .collect()
                }
            }
            LinearOperator::Selection(s) => {
                let mut x = vec![0.0; s.n_cols];
                for (r, yi) in s.rows.iter().zip(y.iter()) {
                    if let Some(c) = r {
                        x[*c] += yi;
                    }
                }
                x
            }
            LinearOperator::Chain(ops) => {
                let mut v = y.to_vec();
                for op in ops.iter().rev() {
                    v = op.apply_adjoint(&v)?;
                }
                v
            }
        };
        Ok(x)
    }

    /// Materialise the operator as a dense matrix
    pub fn to_dense(&self) -> Result<DynamicArray<f64, 2>> {
        let [nrows, ncols] = self.shape();
        let mut matrix = rlst_dynamic_array2!(f64, [nrows, ncols]);
        let mut unit = vec![0.0; ncols];
        for j in 0..ncols {
            unit[j] = 1.0;
            let column = self.apply(&unit)?;
            matrix.data_mut()[j * nrows..(j + 1) * nrows].copy_from_slice(&column);
            unit[j] = 0.0;
        }
        Ok(matrix)
    }

    fn kind(&self) -> &'static str {
        match self {
            LinearOperator::Identity(_) => "Identity operator",
            LinearOperator::Diagonal(_) => "Diagonal operator",
            LinearOperator::Dense(_) => "Dense operator",
            LinearOperator::Selection(_) => "Selection operator",
            LinearOperator::Chain(_) => "Chained operator",
        }
    }
}

impl fmt::Debug for LinearOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [nrows, ncols] = self.shape();
        write!(f, "{} ({nrows} x {ncols})", self.kind())
    }
}

/// Allocate a zeroed dense matrix
pub(crate) fn zeros(nrows: usize, ncols: usize) -> DynamicArray<f64, 2> {
    rlst_dynamic_array2!(f64, [nrows, ncols])
}
