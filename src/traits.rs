//! Trait definitions

mod mapping;
mod mesh;

pub use mapping::{Mapping, MappingExt};
pub use mesh::Mesh;
