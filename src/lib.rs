//! Meshmaps
//!
//! Differentiable maps from inversion parameters to physical property models
//! on tensor meshes, with analytic Jacobians that can be composed and checked
//! against finite differences.
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

pub mod combo;
pub mod maps;
pub mod mesh;
pub mod model_builder;
pub mod numeric;
pub mod operator;
pub mod parametric;
pub mod traits;
pub mod types;
pub mod verify;
