//! Horizontal layer
use super::{CellCoordinates, Indicator, IndicatorValues, ParametricMap, ShapeConfig};
use crate::numeric::{logistic, logistic_derivative};
use crate::traits::Mesh;
use crate::types::{Error, Result};

/// Layer with geometry `(top, thickness)` along the vertical (last) axis
///
/// `I = σ(s (z - top + thickness)) - σ(s (z - top))`
#[derive(Debug, Clone, Copy, Default)]
pub struct Layer;

impl Indicator for Layer {
    const NAME: &'static str = "ParametricLayer";

    fn n_geometry(&self) -> usize {
        2
    }

    fn check_dim(&self, dim: usize) -> Result<()> {
        if (1..=3).contains(&dim) {
            Ok(())
        } else {
            Err(Error::Configuration(format!(
                "{} requires a 1D, 2D or 3D mesh, got a {dim}D mesh",
                Self::NAME
            )))
        }
    }

    fn evaluate(
        &self,
        geometry: &[f64],
        slope: f64,
        cells: &CellCoordinates,
        with_gradient: bool,
    ) -> Result<IndicatorValues> {
        let (top, thickness) = (geometry[0], geometry[1]);
        let mut result = IndicatorValues::new(cells.len(), 2, with_gradient);
        for (cell, z) in cells.vertical().iter().enumerate() {
            let t_bottom = slope * (z - top + thickness);
            let t_top = slope * (z - top);
            result.values[cell] = logistic(t_bottom) - logistic(t_top);
            if with_gradient {
                let d_bottom = slope * logistic_derivative(t_bottom);
                let d_top = slope * logistic_derivative(t_top);
                result.gradient[0][cell] = d_top - d_bottom;
                result.gradient[1][cell] = d_bottom;
            }
        }
        Ok(result)
    }
}

impl ParametricMap<Layer> {
    /// Create a layer map
    ///
    /// Parameters are `(background, foreground, top, thickness)`, the layer
    /// spanning `[top - thickness, top]` along the last axis of the mesh.
    pub fn new<M: Mesh>(mesh: &M, config: ShapeConfig) -> Result<Self> {
        Self::from_shape(mesh, Layer, config)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mesh::{ActiveCells, TensorMesh};
    use crate::parametric::ParametricLayer;
    use crate::traits::Mapping;
    use approx::assert_relative_eq;

    #[test]
    fn test_layer_profile() {
        let mesh = TensorMesh::uniform(&[40, 40], 0.25).unwrap();
        let active = ActiveCells::from_predicate(&mesh, |x| x[1] < 8.0).unwrap();
        let mut config = ShapeConfig::default();
        config.set_slope(40.0);
        config.set_active_cells(active);
        let map = ParametricLayer::new(&mesh, config).unwrap();
        assert_eq!(map.n_params(), 4);
        assert_eq!(map.n_out(), 1280);
        let out = map.forward(&[5.0, 10.0, 4.0, 2.0]).unwrap();
        // Rows are 0.25 thick: row 12 is at z = 3.125, row 4 at z = 1.125, row 20 at z = 5.125
        assert_relative_eq!(out[40 * 12], 10.0, epsilon = 1e-6);
        assert_relative_eq!(out[40 * 4 + 7], 5.0, epsilon = 1e-6);
        assert_relative_eq!(out[40 * 20 + 39], 5.0, epsilon = 1e-6);
    }
}
