//! Surjections broadcasting a smaller model over a mesh
use crate::operator::{LinearOperator, Selection};
use crate::traits::{Mapping, Mesh};
use crate::types::{Axis, Error, Result};
use log::debug;

/// Fixed replication: output cell `i` takes parameter `sources[i]`
struct Replication {
    sources: Selection,
}

impl Replication {
    fn new(n_params: usize, sources: Vec<usize>) -> Result<Self> {
        Ok(Self {
            sources: Selection::new(n_params, sources.into_iter().map(Some).collect())?,
        })
    }

    fn n_params(&self) -> usize {
        self.sources.n_cols()
    }

    fn n_out(&self) -> usize {
        self.sources.rows().len()
    }

    fn forward(&self, params: &[f64]) -> Vec<f64> {
        self.sources.gather(params)
    }

    fn operator(&self) -> LinearOperator {
        LinearOperator::Selection(self.sources.clone())
    }
}

/// Split a linear cell index into per-axis indices
fn axis_indices(mut cell: usize, shape: &[usize]) -> [usize; 3] {
    let mut index = [0; 3];
    for (i, n) in index.iter_mut().zip(shape.iter()) {
        *i = cell % n;
        cell /= n;
    }
    index
}

/// Map a single value onto every cell of a mesh
pub struct SurjectFull {
    replication: Replication,
}

impl SurjectFull {
    /// Create the map for `mesh`
    pub fn new<M: Mesh>(mesh: &M) -> Result<Self> {
        Ok(Self {
            replication: Replication::new(1, vec![0; mesh.n_cells()])?,
        })
    }
}

impl Mapping for SurjectFull {
    fn name(&self) -> &str {
        "SurjectFull"
    }
    fn n_params(&self) -> usize {
        1
    }
    fn n_out(&self) -> usize {
        self.replication.n_out()
    }
    fn forward(&self, params: &[f64]) -> Result<Vec<f64>> {
        self.check_params(params)?;
        Ok(self.replication.forward(params))
    }
    fn derivative(&self, params: &[f64]) -> Result<LinearOperator> {
        self.check_params(params)?;
        Ok(self.replication.operator())
    }
}

/// Map a layered 1D model onto a mesh
///
/// Each parameter is the value of one layer along the last (vertical) axis
/// and is copied to every cell sharing that vertical index.
pub struct SurjectVertical1D {
    replication: Replication,
}

impl SurjectVertical1D {
    /// Create the map for `mesh`
    pub fn new<M: Mesh>(mesh: &M) -> Result<Self> {
        let n_layers = match mesh.shape_cells().last() {
            Some(n) if *n > 0 && mesh.n_cells() > 0 => *n,
            _ => {
                return Err(Error::Configuration(
                    "SurjectVertical1D requires a mesh with at least one layer".to_string(),
                ))
            }
        };
        let layer_size = mesh.n_cells() / n_layers;
        let sources = (0..mesh.n_cells()).map(|cell| cell / layer_size).collect();
        debug!("Vertical surjection of {n_layers} layers onto {} cells", mesh.n_cells());
        Ok(Self {
            replication: Replication::new(n_layers, sources)?,
        })
    }
}

impl Mapping for SurjectVertical1D {
    fn name(&self) -> &str {
        "SurjectVertical1D"
    }
    fn n_params(&self) -> usize {
        self.replication.n_params()
    }
    fn n_out(&self) -> usize {
        self.replication.n_out()
    }
    fn forward(&self, params: &[f64]) -> Result<Vec<f64>> {
        self.check_params(params)?;
        Ok(self.replication.forward(params))
    }
    fn derivative(&self, params: &[f64]) -> Result<LinearOperator> {
        self.check_params(params)?;
        Ok(self.replication.operator())
    }
}

/// Map a model on a 2D cross-section onto a 3D mesh
///
/// The cross-section spans the two axes other than `normal`, in increasing
/// order with the first one running fastest. Its values are repeated along
/// `normal`.
pub struct Surject2Dto3D {
    normal: Axis,
    replication: Replication,
}

impl Surject2Dto3D {
    /// Create the map for a 3D `mesh`
    pub fn new<M: Mesh>(mesh: &M, normal: Axis) -> Result<Self> {
        if mesh.dim() != 3 {
            return Err(Error::Configuration(format!(
                "Surject2Dto3D requires a 3D mesh, got a {}D mesh",
                mesh.dim()
            )));
        }
        let shape = mesh.shape_cells();
        let [a, b] = match normal {
            Axis::X => [1, 2],
            Axis::Y => [0, 2],
            Axis::Z => [0, 1],
        };
        let sources = (0..mesh.n_cells())
            .map(|cell| {
                let index = axis_indices(cell, shape);
                index[a] + shape[a] * index[b]
            })
            .collect();
        Ok(Self {
            normal,
            replication: Replication::new(shape[a] * shape[b], sources)?,
        })
    }

    /// Axis along which the cross-section is repeated
    pub fn normal(&self) -> Axis {
        self.normal
    }
}

impl Mapping for Surject2Dto3D {
    fn name(&self) -> &str {
        "Surject2Dto3D"
    }
    fn n_params(&self) -> usize {
        self.replication.n_params()
    }
    fn n_out(&self) -> usize {
        self.replication.n_out()
    }
    fn forward(&self, params: &[f64]) -> Result<Vec<f64>> {
        self.check_params(params)?;
        Ok(self.replication.forward(params))
    }
    fn derivative(&self, params: &[f64]) -> Result<LinearOperator> {
        self.check_params(params)?;
        Ok(self.replication.operator())
    }
}
