//! Axis-aligned ellipse and ellipsoid
use super::{CellCoordinates, Indicator, IndicatorValues, ParametricMap, ShapeConfig};
use crate::numeric::{logistic, logistic_derivative};
use crate::traits::Mesh;
use crate::types::{Error, Result};

/// Ellipsoid with geometry `(x0, ax, y0, ay[, z0, az])`
///
/// `I = σ(s (1 - Σ ((x_i - c_i) / a_i)²))`
#[derive(Debug, Clone, Copy)]
pub struct Ellipsoid {
    dim: usize,
}

impl Indicator for Ellipsoid {
    const NAME: &'static str = "ParametricEllipsoid";

    fn n_geometry(&self) -> usize {
        2 * self.dim
    }

    fn check_dim(&self, dim: usize) -> Result<()> {
        if dim == 2 || dim == 3 {
            Ok(())
        } else {
            Err(Error::Configuration(format!(
                "{} requires a 2D or 3D mesh, got a {dim}D mesh",
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
        if let Some(axis) = (0..self.dim).find(|a| geometry[2 * a + 1] == 0.0) {
            return Err(Error::NumericRange(format!(
                "Semi-axis {axis} of the ellipsoid is zero"
            )));
        }
        let mut result = IndicatorValues::new(cells.len(), 2 * self.dim, with_gradient);
        let mut scaled = vec![0.0; self.dim];
        for cell in 0..cells.len() {
            let mut q = 0.0;
            for (a, u) in scaled.iter_mut().enumerate() {
                *u = (cells.axis(a)[cell] - geometry[2 * a]) / geometry[2 * a + 1];
                q += *u * *u;
            }
            let t = slope * (1.0 - q);
            result.values[cell] = logistic(t);
            if with_gradient {
                let ds = slope * logistic_derivative(t);
                for (a, u) in scaled.iter().enumerate() {
                    let semi_axis = geometry[2 * a + 1];
                    // dq/dc = -2 u / a and dq/da = -2 u² / a
                    result.gradient[2 * a][cell] = ds * 2.0 * u / semi_axis;
                    result.gradient[2 * a + 1][cell] = ds * 2.0 * u * u / semi_axis;
                }
            }
        }
        Ok(result)
    }
}

impl ParametricMap<Ellipsoid> {
    /// Create an ellipse (2D) or ellipsoid (3D) map
    ///
    /// Parameters are `(background, foreground, x0, ax, y0, ay[, z0, az])`
    /// with `a` the semi-axes.
    pub fn new<M: Mesh>(mesh: &M, config: ShapeConfig) -> Result<Self> {
        Self::from_shape(mesh, Ellipsoid { dim: mesh.dim() }, config)
    }
}
