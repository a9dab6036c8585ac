//! Polynomial interface
use super::{CellCoordinates, Indicator, IndicatorValues, ParametricMap, ShapeConfig};
use crate::numeric::{logistic, logistic_derivative};
use crate::traits::Mesh;
use crate::types::{Axis, Error, Result};

/// Order of the interface polynomial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolyOrder {
    /// Order of a polynomial in one variable (2D meshes), or the same order
    /// in both variables (3D meshes)
    Single(usize),
    /// Orders in the first and second variable (3D meshes)
    Pair(usize, usize),
}

/// Interface `w = f(u[, v])` between two regions
///
/// `w` is the coordinate along `normal` and `u`, `v` the remaining axes in
/// increasing order. In 3D the coefficients multiply `u^i v^j` with `i`
/// running fastest, so order `(1, 1)` gives `c0 + cu u + cv v + cuv u v`.
/// The foreground lies above the interface: `I = σ(s (w - f))`.
#[derive(Debug, Clone, Copy)]
pub struct Poly {
    dim: usize,
    normal: Axis,
    u: usize,
    v: usize,
    orders: [usize; 2],
}

impl Poly {
    fn new(dim: usize, order: PolyOrder, normal: Axis) -> Result<Self> {
        normal.check_dim(dim)?;
        let remaining = (0..dim).filter(|a| *a != normal.index()).collect::<Vec<_>>();
        let orders = match (dim, order) {
            (2, PolyOrder::Single(k)) => [k, 0],
            (2, PolyOrder::Pair(..)) => {
                return Err(Error::Configuration(
                    "A pair of polynomial orders needs a 3D mesh".to_string(),
                ))
            }
            (3, PolyOrder::Single(k)) => [k, k],
            (3, PolyOrder::Pair(ku, kv)) => [ku, kv],
            _ => {
                return Err(Error::Configuration(format!(
                    "{} requires a 2D or 3D mesh, got a {dim}D mesh",
                    Self::NAME
                )))
            }
        };
        Ok(Self {
            dim,
            normal,
            u: remaining[0],
            // Unused in 2D, where the order in v is zero
            v: remaining[remaining.len() - 1],
            orders,
        })
    }

    /// Axis along which the interface is a function of the others
    pub fn normal(&self) -> Axis {
        self.normal
    }

    /// Polynomial orders in `u` and `v`
    pub fn orders(&self) -> [usize; 2] {
        self.orders
    }

    fn n_terms(&self) -> usize {
        (self.orders[0] + 1) * (self.orders[1] + 1)
    }

    fn basis(&self, u: f64, v: f64, out: &mut [f64]) {
        let mut k = 0;
        for j in 0..=self.orders[1] {
            let vj = v.powi(j as i32);
            for i in 0..=self.orders[0] {
                out[k] = u.powi(i as i32) * vj;
                k += 1;
            }
        }
    }
}

impl Indicator for Poly {
    const NAME: &'static str = "ParametricPolyMap";

    fn n_geometry(&self) -> usize {
        self.n_terms()
    }

    fn check_dim(&self, dim: usize) -> Result<()> {
        if dim == self.dim {
            Ok(())
        } else {
            Err(Error::Configuration(format!(
                "{} was configured for a {}D mesh, got a {dim}D mesh",
                Self::NAME,
                self.dim
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
        let mut result = IndicatorValues::new(cells.len(), self.n_terms(), with_gradient);
        let mut phi = vec![0.0; self.n_terms()];
        let (u, v, w) = (
            cells.axis(self.u),
            cells.axis(self.v),
            cells.axis(self.normal.index()),
        );
        for cell in 0..cells.len() {
            self.basis(u[cell], v[cell], &mut phi);
            let f = crate::numeric::dot(&phi, geometry);
            if !f.is_finite() {
                return Err(Error::NumericRange(format!(
                    "Interface polynomial is not finite at cell {cell}"
                )));
            }
            let t = slope * (w[cell] - f);
            result.values[cell] = logistic(t);
            if with_gradient {
                let ds = slope * logistic_derivative(t);
                for (gradient, p) in result.gradient.iter_mut().zip(phi.iter()) {
                    gradient[cell] = -ds * p;
                }
            }
        }
        Ok(result)
    }
}

impl ParametricMap<Poly> {
    /// Create a polynomial interface map
    ///
    /// Parameters are `(background, foreground, c...)` with one coefficient
    /// per polynomial term. The background lies below the interface.
    pub fn new<M: Mesh>(
        mesh: &M,
        order: PolyOrder,
        normal: Axis,
        config: ShapeConfig,
    ) -> Result<Self> {
        let poly = Poly::new(mesh.dim(), order, normal)?;
        Self::from_shape(mesh, poly, config)
    }
}
