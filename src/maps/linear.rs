//! Fixed linear maps
use crate::operator::{zeros, LinearOperator};
use crate::traits::Mapping;
use crate::types::{Error, Result};
use rlst::{DynamicArray, RawAccessMut};
use std::sync::Arc;

/// Map `p -> A p + b` for a fixed matrix `A` and offset `b`
pub struct LinearMap {
    matrix: Arc<DynamicArray<f64, 2>>,
    offset: Option<Vec<f64>>,
    shape: [usize; 2],
}

impl LinearMap {
    /// Create a linear map from a dense matrix
    pub fn new(matrix: DynamicArray<f64, 2>) -> Self {
        let matrix = Arc::new(matrix);
        let shape = LinearOperator::Dense(matrix.clone()).shape();
        Self {
            matrix,
            offset: None,
            shape,
        }
    }

    /// Create a linear map from a row-major list of rows
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, |r| r.len());
        if let Some(i) = rows.iter().position(|r| r.len() != ncols) {
            return Err(Error::Configuration(format!(
                "Row {i} of the matrix has {} entries, expected {ncols}",
                rows[i].len()
            )));
        }
        let mut matrix = zeros(nrows, ncols);
        let data = matrix.data_mut();
        for (i, row) in rows.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                data[i + j * nrows] = *value;
            }
        }
        Ok(Self::new(matrix))
    }

    /// Add a constant offset to the output
    pub fn with_offset(mut self, offset: Vec<f64>) -> Result<Self> {
        if offset.len() != self.shape[0] {
            return Err(Error::Configuration(format!(
                "Offset has {} entries but the matrix has {} rows",
                offset.len(),
                self.shape[0]
            )));
        }
        self.offset = Some(offset);
        Ok(self)
    }

    fn operator(&self) -> LinearOperator {
        LinearOperator::Dense(self.matrix.clone())
    }
}

impl Mapping for LinearMap {
    fn name(&self) -> &str {
        "LinearMap"
    }
    fn n_params(&self) -> usize {
        self.shape[1]
    }
    fn n_out(&self) -> usize {
        self.shape[0]
    }
    fn forward(&self, params: &[f64]) -> Result<Vec<f64>> {
        self.check_params(params)?;
        let mut out = self.operator().apply(params)?;
        if let Some(offset) = &self.offset {
            for (o, b) in out.iter_mut().zip(offset.iter()) {
                *o += b;
            }
        }
        Ok(out)
    }
    fn derivative(&self, params: &[f64]) -> Result<LinearOperator> {
        self.check_params(params)?;
        Ok(self.operator())
    }
}
