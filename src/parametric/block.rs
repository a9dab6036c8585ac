//! Axis-aligned block
use super::{CellCoordinates, Indicator, IndicatorValues, ParametricMap, ShapeConfig};
use crate::numeric::{logistic, logistic_derivative};
use crate::traits::Mesh;
use crate::types::{Error, Result};

/// Block with geometry `(x0, hx[, y0, hy[, z0, hz]])`, `h` being half-widths
///
/// The indicator is the product over the axes of
/// `σ(s (x - c + h)) σ(s (c + h - x))`.
#[derive(Debug, Clone, Copy)]
pub struct Block {
    dim: usize,
}

impl Indicator for Block {
    const NAME: &'static str = "ParametricBlock";

    fn n_geometry(&self) -> usize {
        2 * self.dim
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
        let mut result = IndicatorValues::new(cells.len(), 2 * self.dim, with_gradient);
        // Per-axis factor and its derivatives with respect to centre and half-width
        let mut factors = vec![0.0; self.dim];
        let mut d_centre = vec![0.0; self.dim];
        let mut d_half_width = vec![0.0; self.dim];
        for cell in 0..cells.len() {
            for a in 0..self.dim {
                let (c, h) = (geometry[2 * a], geometry[2 * a + 1]);
                let x = cells.axis(a)[cell];
                let (t_low, t_high) = (slope * (x - c + h), slope * (c + h - x));
                let (low, high) = (logistic(t_low), logistic(t_high));
                let (d_low, d_high) = (
                    slope * logistic_derivative(t_low),
                    slope * logistic_derivative(t_high),
                );
                factors[a] = low * high;
                d_centre[a] = low * d_high - d_low * high;
                d_half_width[a] = d_low * high + low * d_high;
            }
            result.values[cell] = factors.iter().product();
            if with_gradient {
                for a in 0..self.dim {
                    let others = factors
                        .iter()
                        .enumerate()
                        .filter(|(b, _)| *b != a)
                        .map(|(_, f)| f)
                        .product::<f64>();
                    result.gradient[2 * a][cell] = others * d_centre[a];
                    result.gradient[2 * a + 1][cell] = others * d_half_width[a];
                }
            }
        }
        Ok(result)
    }
}

impl ParametricMap<Block> {
    /// Create a block map
    ///
    /// Parameters are `(background, foreground, x0, hx[, y0, hy[, z0, hz]])`
    /// with `h` the half-widths.
    pub fn new<M: Mesh>(mesh: &M, config: ShapeConfig) -> Result<Self> {
        Self::from_shape(mesh, Block { dim: mesh.dim() }, config)
    }
}
