//! Rectilinear tensor mesh
use crate::traits::Mesh;
use crate::types::{Axis, Error, Result};
use log::debug;

/// A rectilinear mesh described by cell widths along each axis
///
/// Only cell centres are derived from the widths; the mesh carries no
/// topology.
#[derive(Debug, Clone)]
pub struct TensorMesh {
    widths: Vec<Vec<f64>>,
    origin: Vec<f64>,
    shape: Vec<usize>,
    // Gridded cell centres, one vector per axis
    centers: Vec<Vec<f64>>,
}

impl TensorMesh {
    /// Create a mesh from the cell widths along each axis and an origin
    ///
    /// If `origin` is `None` the mesh starts at zero on every axis.
    pub fn new(widths: Vec<Vec<f64>>, origin: Option<Vec<f64>>) -> Result<Self> {
        let dim = widths.len();
        if !(1..=3).contains(&dim) {
            return Err(Error::Configuration(format!(
                "A tensor mesh must have 1, 2 or 3 axes, got {dim}"
            )));
        }
        for (axis, w) in widths.iter().enumerate() {
            if w.is_empty() {
                return Err(Error::Configuration(format!("Axis {axis} has no cells")));
            }
            if w.iter().any(|h| !h.is_finite() || *h <= 0.0) {
                return Err(Error::Configuration(format!(
                    "Cell widths along axis {axis} must be positive and finite"
                )));
            }
        }
        let origin = origin.unwrap_or_else(|| vec![0.0; dim]);
        if origin.len() != dim {
            return Err(Error::Configuration(format!(
                "Origin has {} entries for a {dim}D mesh",
                origin.len()
            )));
        }

        let shape = widths.iter().map(|w| w.len()).collect::<Vec<_>>();
        let axis_centers = widths
            .iter()
            .zip(origin.iter())
            .map(|(w, x0)| centers_from_widths(w, *x0))
            .collect::<Vec<_>>();

        let n_cells = shape.iter().product::<usize>();
        let mut centers = vec![Vec::with_capacity(n_cells); dim];
        for cell in 0..n_cells {
            let mut rest = cell;
            for (axis, n) in shape.iter().enumerate() {
                centers[axis].push(axis_centers[axis][rest % n]);
                rest /= n;
            }
        }
        debug!("Created {dim}D tensor mesh with shape {shape:?}");

        Ok(Self {
            widths,
            origin,
            shape,
            centers,
        })
    }

    /// Create a mesh of equal cells of width `width` starting at zero
    pub fn uniform(shape: &[usize], width: f64) -> Result<Self> {
        Self::new(shape.iter().map(|n| vec![width; *n]).collect(), None)
    }

    /// The same mesh moved to a new origin
    pub fn with_origin(self, origin: Vec<f64>) -> Result<Self> {
        Self::new(self.widths, Some(origin))
    }

    /// Origin of the mesh
    pub fn origin(&self) -> &[f64] {
        &self.origin
    }

    /// Cell widths along `axis`
    pub fn widths(&self, axis: Axis) -> Result<&[f64]> {
        axis.check_dim(self.dim())?;
        Ok(&self.widths[axis.index()])
    }

    /// Node positions along `axis`
    pub fn nodes(&self, axis: Axis) -> Result<Vec<f64>> {
        let widths = self.widths(axis)?;
        let mut nodes = Vec::with_capacity(widths.len() + 1);
        let mut x = self.origin[axis.index()];
        nodes.push(x);
        for h in widths {
            x += h;
            nodes.push(x);
        }
        Ok(nodes)
    }

    /// Cell centres along `axis`, one per cell on that axis
    pub fn axis_centers(&self, axis: Axis) -> Result<Vec<f64>> {
        let widths = self.widths(axis)?;
        Ok(centers_from_widths(widths, self.origin[axis.index()]))
    }

    /// Linear index of the cell with per-axis indices `index`
    pub fn cell_index(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.dim() {
            return None;
        }
        let mut linear = 0;
        let mut stride = 1;
        for (i, n) in index.iter().zip(self.shape.iter()) {
            if i >= n {
                return None;
            }
            linear += i * stride;
            stride *= n;
        }
        Some(linear)
    }
}

fn centers_from_widths(widths: &[f64], x0: f64) -> Vec<f64> {
    let mut x = x0;
    widths
        .iter()
        .map(|h| {
            let c = x + 0.5 * h;
            x += h;
            c
        })
        .collect()
}

impl Mesh for TensorMesh {
    fn dim(&self) -> usize {
        self.shape.len()
    }

    fn shape_cells(&self) -> &[usize] {
        &self.shape
    }

    fn cell_centers(&self, axis: Axis) -> Result<&[f64]> {
        axis.check_dim(self.dim())?;
        Ok(&self.centers[axis.index()])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cell_ordering() {
        let mesh = TensorMesh::new(vec![vec![1.0, 2.0], vec![1.0; 3]], None).unwrap();
        assert_eq!(mesh.n_cells(), 6);
        let x = mesh.cell_centers(Axis::X).unwrap();
        let y = mesh.cell_centers(Axis::Y).unwrap();
        // First axis runs fastest
        assert_relative_eq!(x[0], 0.5);
        assert_relative_eq!(x[1], 2.0);
        assert_relative_eq!(x[2], 0.5);
        assert_relative_eq!(y[0], 0.5);
        assert_relative_eq!(y[1], 0.5);
        assert_relative_eq!(y[5], 2.5);
        assert_eq!(mesh.cell_index(&[1, 2]), Some(5));
        assert_eq!(mesh.cell_index(&[2, 0]), None);
    }

    #[test]
    fn test_origin_and_nodes() {
        let mesh = TensorMesh::uniform(&[4], 0.5)
            .unwrap()
            .with_origin(vec![-1.0])
            .unwrap();
        let nodes = mesh.nodes(Axis::X).unwrap();
        assert_eq!(nodes.len(), 5);
        assert_relative_eq!(nodes[0], -1.0);
        assert_relative_eq!(nodes[4], 1.0);
        assert_relative_eq!(mesh.cell_centers(Axis::X).unwrap()[0], -0.75);
        assert!(mesh.cell_centers(Axis::Y).is_err());
    }

    #[test]
    fn test_invalid_meshes() {
        assert!(TensorMesh::new(vec![], None).is_err());
        assert!(TensorMesh::new(vec![vec![1.0]; 4], None).is_err());
        assert!(TensorMesh::new(vec![vec![1.0, -1.0]], None).is_err());
        assert!(TensorMesh::new(vec![vec![1.0]], Some(vec![0.0, 0.0])).is_err());
    }
}
