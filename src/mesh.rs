//! Geometry providers and active-cell masks

mod active_cells;
mod tensor_mesh;

pub use active_cells::ActiveCells;
pub use tensor_mesh::TensorMesh;
