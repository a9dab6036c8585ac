//! Circle
use super::{CellCoordinates, Indicator, IndicatorValues, ParametricMap, ShapeConfig};
use crate::numeric::{logistic, logistic_derivative};
use crate::traits::Mesh;
use crate::types::{Error, Result};

/// Circle with geometry `(x0, y0, r)`
///
/// `I = σ(s (r - |x - x0|))`
#[derive(Debug, Clone, Copy, Default)]
pub struct Circle;

impl Indicator for Circle {
    const NAME: &'static str = "ParametricCircleMap";

    fn n_geometry(&self) -> usize {
        3
    }

    fn check_dim(&self, dim: usize) -> Result<()> {
        if dim == 2 {
            Ok(())
        } else {
            Err(Error::Configuration(format!(
                "{} requires a 2D mesh, got a {dim}D mesh",
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
        let (x0, y0, r) = (geometry[0], geometry[1], geometry[2]);
        let mut result = IndicatorValues::new(cells.len(), 3, with_gradient);
        for (cell, (x, y)) in cells.axis(0).iter().zip(cells.axis(1)).enumerate() {
            let (dx, dy) = (x - x0, y - y0);
            let distance = dx.hypot(dy);
            let t = slope * (r - distance);
            result.values[cell] = logistic(t);
            if with_gradient {
                let ds = slope * logistic_derivative(t);
                // The distance has no gradient at the centre itself
                if distance > 0.0 {
                    result.gradient[0][cell] = ds * dx / distance;
                    result.gradient[1][cell] = ds * dy / distance;
                }
                result.gradient[2][cell] = ds;
            }
        }
        Ok(result)
    }
}

impl ParametricMap<Circle> {
    /// Create a circle map on a 2D mesh
    ///
    /// Parameters are `(background, foreground, x0, y0, r)`.
    pub fn new<M: Mesh>(mesh: &M, config: ShapeConfig) -> Result<Self> {
        Self::from_shape(mesh, Circle, config)
    }
}
