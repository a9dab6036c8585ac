//! Types shared across the crate

use std::fmt;
use std::str::FromStr;

/// Errors raised while building or evaluating a mapping
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid construction options (lengths, axes, masks, orders)
    #[error("Configuration Error: {0}")]
    Configuration(String),
    /// A vector handed to a map or operator has the wrong length
    #[error("Parameter Shape Error: {map} expects a vector of length {expected}, got {actual}")]
    ParameterShape {
        /// Name of the map or operator
        map: String,
        /// Declared length
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },
    /// An evaluation left the representable floating point range
    #[error("Numeric Range Error: {0}")]
    NumericRange(String),
    /// An analytic derivative failed to converge against finite differences
    #[error("Derivative Mismatch Error: observed order {order:.3} does not exceed {threshold:.3}")]
    DerivativeMismatch {
        /// Order of convergence that was observed
        order: f64,
        /// Order that had to be exceeded
        threshold: f64,
    },
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// A spatial axis of a mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Axis {
    /// First axis
    X = 0,
    /// Second axis
    Y = 1,
    /// Third axis
    Z = 2,
}

impl Axis {
    /// Index of the axis
    pub fn index(self) -> usize {
        self as usize
    }

    /// Axis with the given index
    pub fn from_index(index: usize) -> Result<Self> {
        match index {
            0 => Ok(Axis::X),
            1 => Ok(Axis::Y),
            2 => Ok(Axis::Z),
            _ => Err(Error::Configuration(format!(
                "Axis index {index} out of range, expected 0, 1 or 2"
            ))),
        }
    }

    /// Check that the axis exists on a mesh of dimension `dim`
    pub(crate) fn check_dim(self, dim: usize) -> Result<()> {
        if self.index() < dim {
            Ok(())
        } else {
            Err(Error::Configuration(format!(
                "Axis {self} does not exist on a {dim}D mesh"
            )))
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Axis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "X" => Ok(Axis::X),
            "Y" => Ok(Axis::Y),
            "Z" => Ok(Axis::Z),
            _ => Err(Error::Configuration(format!("Unknown axis {s:?}"))),
        }
    }
}
