//! Shared numeric helpers
use crate::types::{Error, Result};
use num::Float;

/// Logistic function `1 / (1 + exp(-t))`
///
/// Evaluated so that neither branch overflows for large `|t|`.
pub fn logistic<T: Float>(t: T) -> T {
    if t >= T::zero() {
        T::one() / (T::one() + (-t).exp())
    } else {
        let e = t.exp();
        e / (T::one() + e)
    }
}

/// Derivative of [`logistic`]
pub fn logistic_derivative<T: Float>(t: T) -> T {
    let s = logistic(t);
    s * (T::one() - s)
}

/// Exponential that fails instead of overflowing to infinity
pub fn checked_exp<T: Float + std::fmt::Display>(x: T) -> Result<T> {
    if x.is_nan() {
        return Err(Error::NumericRange("exp of NaN".to_string()));
    }
    if x > T::max_value().ln() {
        return Err(Error::NumericRange(format!(
            "exp({x}) overflows the floating point range"
        )));
    }
    Ok(x.exp())
}

/// Dot product
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Euclidean norm
pub fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// Check the length of a vector handed to a map or operator
pub(crate) fn check_len(name: &str, expected: usize, values: &[f64]) -> Result<()> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(Error::ParameterShape {
            map: name.to_string(),
            expected,
            actual: values.len(),
        })
    }
}
