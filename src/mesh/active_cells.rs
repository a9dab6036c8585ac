//! Active-cell masks
use crate::traits::Mesh;
use crate::types::{Axis, Error, Result};

/// Boolean mask marking the independently modelled cells of a mesh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveCells {
    mask: Vec<bool>,
    indices: Vec<usize>,
}

impl ActiveCells {
    /// Create a mask for a mesh with `n_cells` cells
    pub fn new(mask: Vec<bool>, n_cells: usize) -> Result<Self> {
        if mask.len() != n_cells {
            return Err(Error::Configuration(format!(
                "Active cell mask has {} entries but the mesh has {n_cells} cells",
                mask.len()
            )));
        }
        let indices = mask
            .iter()
            .enumerate()
            .filter_map(|(i, a)| if *a { Some(i) } else { None })
            .collect();
        Ok(Self { mask, indices })
    }

    /// Every cell of a mesh with `n_cells` cells is active
    pub fn all(n_cells: usize) -> Self {
        Self {
            mask: vec![true; n_cells],
            indices: (0..n_cells).collect(),
        }
    }

    /// Mark the cells whose centre satisfies `predicate`
    ///
    /// The predicate receives the centre coordinates of a cell, one entry per
    /// axis.
    pub fn from_predicate<M: Mesh, F: Fn(&[f64]) -> bool>(mesh: &M, predicate: F) -> Result<Self> {
        let centers = (0..mesh.dim())
            .map(|axis| mesh.cell_centers(Axis::from_index(axis)?))
            .collect::<Result<Vec<_>>>()?;
        let mut point = vec![0.0; mesh.dim()];
        let mask = (0..mesh.n_cells())
            .map(|cell| {
                for (p, c) in point.iter_mut().zip(centers.iter()) {
                    *p = c[cell];
                }
                predicate(&point)
            })
            .collect();
        Self::new(mask, mesh.n_cells())
    }

    /// Number of cells in the mesh
    pub fn len(&self) -> usize {
        self.mask.len()
    }

    /// Whether the mesh has no cells
    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    /// Number of active cells
    pub fn n_active(&self) -> usize {
        self.indices.len()
    }

    /// The mask
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Indices of the active cells in increasing order
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Pick the entries of a full-mesh vector that belong to active cells
    pub(crate) fn select(&self, values: &[f64]) -> Vec<f64> {
        self.indices.iter().map(|i| values[*i]).collect()
    }
}
