//! Elementwise transforms for positive physical properties
use crate::numeric::checked_exp;
use crate::operator::LinearOperator;
use crate::traits::Mapping;
use crate::types::{Error, Result};

/// Elementwise exponential, typically mapping log-conductivity to conductivity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpMap {
    n: usize,
}

impl ExpMap {
    /// Create an exponential map on vectors of length `n`
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    /// Elementwise natural logarithm of a model vector
    pub fn inverse(&self, model: &[f64]) -> Result<Vec<f64>> {
        crate::numeric::check_len("ExpMap inverse", self.n, model)?;
        model
            .iter()
            .map(|v| {
                if *v > 0.0 {
                    Ok(v.ln())
                } else {
                    Err(Error::NumericRange(format!(
                        "Cannot take the logarithm of {v}"
                    )))
                }
            })
            .collect()
    }
}

impl Mapping for ExpMap {
    fn name(&self) -> &str {
        "ExpMap"
    }
    fn n_params(&self) -> usize {
        self.n
    }
    fn n_out(&self) -> usize {
        self.n
    }
    fn forward(&self, params: &[f64]) -> Result<Vec<f64>> {
        self.check_params(params)?;
        params.iter().map(|p| checked_exp(*p)).collect()
    }
    fn derivative(&self, params: &[f64]) -> Result<LinearOperator> {
        Ok(LinearOperator::Diagonal(self.forward(params)?))
    }
}

/// Elementwise reciprocal, mapping resistivity to conductivity and back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReciprocalMap {
    n: usize,
}

impl ReciprocalMap {
    /// Create a reciprocal map on vectors of length `n`
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    fn checked_reciprocal(p: f64) -> Result<f64> {
        let r = 1.0 / p;
        if r.is_finite() {
            Ok(r)
        } else {
            Err(Error::NumericRange(format!("Reciprocal of {p} is not finite")))
        }
    }
}

impl Mapping for ReciprocalMap {
    fn name(&self) -> &str {
        "ReciprocalMap"
    }
    fn n_params(&self) -> usize {
        self.n
    }
    fn n_out(&self) -> usize {
        self.n
    }
    fn forward(&self, params: &[f64]) -> Result<Vec<f64>> {
        self.check_params(params)?;
        params.iter().map(|p| Self::checked_reciprocal(*p)).collect()
    }
    fn derivative(&self, params: &[f64]) -> Result<LinearOperator> {
        let diagonal = self
            .forward(params)?
            .into_iter()
            .zip(params.iter())
            .map(|(r, p)| {
                let d = -r * r;
                if d.is_finite() {
                    Ok(d)
                } else {
                    Err(Error::NumericRange(format!(
                        "Derivative of the reciprocal at {p} is not finite"
                    )))
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(LinearOperator::Diagonal(diagonal))
    }
}
