//! Parametric shape maps
//!
//! A shape map blends a background and a foreground value through a smooth
//! indicator of a geometric shape:
//!
//! `value = background + (foreground - background) * I(x)`
//!
//! where `I` is built from logistic functions whose sharpness is set by the
//! `slope` of the [`ShapeConfig`]. Parameters are the two property values
//! followed by the geometric coefficients of the shape.

mod block;
mod circle;
mod ellipsoid;
mod layer;
mod poly;

pub use block::Block;
pub use circle::Circle;
pub use ellipsoid::Ellipsoid;
pub use layer::Layer;
pub use poly::{Poly, PolyOrder};

use crate::mesh::ActiveCells;
use crate::numeric::checked_exp;
use crate::operator::{zeros, LinearOperator};
use crate::traits::{Mapping, Mesh};
use crate::types::{Axis, Error, Result};
use log::{debug, warn};
use rlst::RawAccessMut;

/// Circle in a 2D mesh
pub type ParametricCircleMap = ParametricMap<Circle>;
/// Ellipse or ellipsoid aligned with the mesh axes
pub type ParametricEllipsoid = ParametricMap<Ellipsoid>;
/// Rectangular block aligned with the mesh axes
pub type ParametricBlock = ParametricMap<Block>;
/// Horizontal layer
pub type ParametricLayer = ParametricMap<Layer>;
/// Two regions separated by a polynomial interface
pub type ParametricPolyMap = ParametricMap<Poly>;

/// Which of the first two parameters is the background value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueOrder {
    /// `(background, foreground, ...)`
    #[default]
    BackgroundFirst,
    /// `(foreground, background, ...)`
    ForegroundFirst,
}

/// Options shared by all shape maps
#[derive(Debug, Clone)]
pub struct ShapeConfig {
    slope: f64,
    log_values: bool,
    value_order: ValueOrder,
    active_cells: Option<ActiveCells>,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            slope: 1.0,
            log_values: false,
            value_order: ValueOrder::BackgroundFirst,
            active_cells: None,
        }
    }
}

impl ShapeConfig {
    /// Set the sharpness of the logistic indicator
    pub fn set_slope(&mut self, slope: f64) {
        self.slope = slope;
    }

    /// Treat the two property values as logarithms
    pub fn set_log_values(&mut self, log_values: bool) {
        self.log_values = log_values;
    }

    /// Set which of the first two parameters is the background
    pub fn set_value_order(&mut self, value_order: ValueOrder) {
        self.value_order = value_order;
    }

    /// Restrict the output to the active cells
    pub fn set_active_cells(&mut self, active_cells: ActiveCells) {
        self.active_cells = Some(active_cells);
    }

    /// Sharpness of the logistic indicator
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Whether the property values are logarithms
    pub fn log_values(&self) -> bool {
        self.log_values
    }

    /// Order of the two property values
    pub fn value_order(&self) -> ValueOrder {
        self.value_order
    }
}

/// Centre coordinates of the active cells
#[derive(Debug, Clone)]
pub struct CellCoordinates {
    axes: Vec<Vec<f64>>,
}

impl CellCoordinates {
    fn new<M: Mesh>(mesh: &M, active: &ActiveCells) -> Result<Self> {
        let axes = (0..mesh.dim())
            .map(|axis| Ok(active.select(mesh.cell_centers(Axis::from_index(axis)?)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { axes })
    }

    /// Spatial dimension
    pub fn dim(&self) -> usize {
        self.axes.len()
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.axes.first().map_or(0, |a| a.len())
    }

    /// Whether there are no cells
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Coordinates along axis `axis`
    pub fn axis(&self, axis: usize) -> &[f64] {
        &self.axes[axis]
    }

    /// Coordinates along the last (vertical) axis
    pub fn vertical(&self) -> &[f64] {
        &self.axes[self.axes.len() - 1]
    }
}

/// Indicator values of a shape at every cell
pub struct IndicatorValues {
    /// Indicator at every cell
    pub values: Vec<f64>,
    /// Derivative of the indicator with respect to each geometric
    /// coefficient, one vector per coefficient; empty unless requested
    pub gradient: Vec<Vec<f64>>,
}

impl IndicatorValues {
    /// Zeroed values for `n_cells` cells and `n_geometry` coefficients
    pub fn new(n_cells: usize, n_geometry: usize, with_gradient: bool) -> Self {
        Self {
            values: vec![0.0; n_cells],
            gradient: if with_gradient {
                vec![vec![0.0; n_cells]; n_geometry]
            } else {
                vec![]
            },
        }
    }
}

/// A smooth indicator of a geometric shape
pub trait Indicator: Send + Sync {
    /// Name of the map built from this shape
    const NAME: &'static str;

    /// Number of geometric coefficients
    fn n_geometry(&self) -> usize;

    /// Check that the shape can be evaluated on cells of dimension `dim`
    fn check_dim(&self, dim: usize) -> Result<()>;

    /// Evaluate the indicator, and its gradient if `with_gradient` is set
    fn evaluate(
        &self,
        geometry: &[f64],
        slope: f64,
        cells: &CellCoordinates,
        with_gradient: bool,
    ) -> Result<IndicatorValues>;
}

/// A shape map
pub struct ParametricMap<S: Indicator> {
    shape: S,
    cells: CellCoordinates,
    slope: f64,
    log_values: bool,
    value_order: ValueOrder,
}

/// The two property values and their derivatives with respect to their slots
struct PropertyValues {
    background: f64,
    foreground: f64,
    background_slot: usize,
    foreground_slot: usize,
    d_background: f64,
    d_foreground: f64,
}

impl<S: Indicator> ParametricMap<S> {
    /// Create a shape map from any indicator
    pub fn from_shape<M: Mesh>(mesh: &M, shape: S, config: ShapeConfig) -> Result<Self> {
        if !config.slope.is_finite() || config.slope <= 0.0 {
            return Err(Error::Configuration(format!(
                "Slope must be positive and finite, got {}",
                config.slope
            )));
        }
        if config.slope > 1e4 {
            warn!(
                "{} built with slope {}: derivatives will be nearly singular at the interface",
                S::NAME,
                config.slope
            );
        }
        shape.check_dim(mesh.dim())?;
        let active = match config.active_cells {
            Some(active) => {
                if active.len() != mesh.n_cells() {
                    return Err(Error::Configuration(format!(
                        "Active cell mask has {} entries but the mesh has {} cells",
                        active.len(),
                        mesh.n_cells()
                    )));
                }
                active
            }
            None => ActiveCells::all(mesh.n_cells()),
        };
        let cells = CellCoordinates::new(mesh, &active)?;
        debug!(
            "{} on {} of {} cells with slope {}",
            S::NAME,
            cells.len(),
            mesh.n_cells(),
            config.slope
        );
        Ok(Self {
            shape,
            cells,
            slope: config.slope,
            log_values: config.log_values,
            value_order: config.value_order,
        })
    }

    /// The shape
    pub fn shape(&self) -> &S {
        &self.shape
    }

    /// Sharpness of the logistic indicator
    pub fn slope(&self) -> f64 {
        self.slope
    }

    fn property_values(&self, params: &[f64]) -> Result<PropertyValues> {
        let (background_slot, foreground_slot) = match self.value_order {
            ValueOrder::BackgroundFirst => (0, 1),
            ValueOrder::ForegroundFirst => (1, 0),
        };
        let (background, foreground) = (params[background_slot], params[foreground_slot]);
        if self.log_values {
            let background = checked_exp(background)?;
            let foreground = checked_exp(foreground)?;
            Ok(PropertyValues {
                background,
                foreground,
                background_slot,
                foreground_slot,
                d_background: background,
                d_foreground: foreground,
            })
        } else {
            Ok(PropertyValues {
                background,
                foreground,
                background_slot,
                foreground_slot,
                d_background: 1.0,
                d_foreground: 1.0,
            })
        }
    }

    fn check_finite(&self, values: &[f64]) -> Result<()> {
        if values.iter().all(|v| v.is_finite()) {
            Ok(())
        } else {
            Err(Error::NumericRange(format!(
                "{} produced a non-finite value",
                S::NAME
            )))
        }
    }
}

impl<S: Indicator> Mapping for ParametricMap<S> {
    fn name(&self) -> &str {
        S::NAME
    }

    fn n_params(&self) -> usize {
        2 + self.shape.n_geometry()
    }

    fn n_out(&self) -> usize {
        self.cells.len()
    }

    fn forward(&self, params: &[f64]) -> Result<Vec<f64>> {
        self.check_params(params)?;
        let values = self.property_values(params)?;
        let indicator = self
            .shape
            .evaluate(&params[2..], self.slope, &self.cells, false)?;
        let contrast = values.foreground - values.background;
        let out = indicator
            .values
            .iter()
            .map(|i| values.background + contrast * i)
            .collect::<Vec<_>>();
        self.check_finite(&out)?;
        Ok(out)
    }

    fn derivative(&self, params: &[f64]) -> Result<LinearOperator> {
        self.check_params(params)?;
        let values = self.property_values(params)?;
        let indicator = self
            .shape
            .evaluate(&params[2..], self.slope, &self.cells, true)?;
        let contrast = values.foreground - values.background;

        let n = self.n_out();
        let mut jacobian = zeros(n, self.n_params());
        let data = jacobian.data_mut();
        for (cell, i) in indicator.values.iter().enumerate() {
            data[cell + values.background_slot * n] = (1.0 - i) * values.d_background;
            data[cell + values.foreground_slot * n] = i * values.d_foreground;
        }
        for (k, gradient) in indicator.gradient.iter().enumerate() {
            for (cell, g) in gradient.iter().enumerate() {
                data[cell + (k + 2) * n] = contrast * g;
            }
        }
        self.check_finite(data)?;
        Ok(LinearOperator::dense(jacobian))
    }
}
