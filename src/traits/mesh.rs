//! Geometry provider
use crate::types::{Axis, Result};

/// A mesh exposing the per-cell geometry the maps are built from
///
/// Cells are numbered with the first axis running fastest.
pub trait Mesh {
    /// Spatial dimension (1, 2 or 3)
    fn dim(&self) -> usize;

    /// Number of cells along each axis
    fn shape_cells(&self) -> &[usize];

    /// Total number of cells
    fn n_cells(&self) -> usize {
        self.shape_cells().iter().product()
    }

    /// Coordinate of every cell centre along `axis`
    fn cell_centers(&self, axis: Axis) -> Result<&[f64]>;
}
