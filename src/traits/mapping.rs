//! Differentiable mappings
use crate::combo::ComboMap;
use crate::operator::LinearOperator;
use crate::types::{Error, Result};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use std::sync::Arc;

/// A differentiable map from a parameter vector to a model vector
///
/// Implementations hold no mutable state, so `forward` and `derivative` can be
/// called concurrently on the same instance.
pub trait Mapping: Send + Sync {
    /// Name used in diagnostics
    fn name(&self) -> &str;

    /// Length of the parameter vector
    fn n_params(&self) -> usize;

    /// Length of the model vector
    fn n_out(&self) -> usize;

    /// Evaluate the map
    fn forward(&self, params: &[f64]) -> Result<Vec<f64>>;

    /// Jacobian of the map at `params`
    fn derivative(&self, params: &[f64]) -> Result<LinearOperator>;

    /// Check that `params` has the declared length
    fn check_params(&self, params: &[f64]) -> Result<()> {
        if params.len() == self.n_params() {
            Ok(())
        } else {
            Err(Error::ParameterShape {
                map: self.name().to_string(),
                expected: self.n_params(),
                actual: params.len(),
            })
        }
    }

    /// Evaluate the map for many independent parameter vectors in parallel
    fn forward_batch(&self, batch: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        batch.par_iter().map(|params| self.forward(params)).collect()
    }
}

impl<M: Mapping + ?Sized> Mapping for Arc<M> {
    fn name(&self) -> &str {
        (**self).name()
    }
    fn n_params(&self) -> usize {
        (**self).n_params()
    }
    fn n_out(&self) -> usize {
        (**self).n_out()
    }
    fn forward(&self, params: &[f64]) -> Result<Vec<f64>> {
        (**self).forward(params)
    }
    fn derivative(&self, params: &[f64]) -> Result<LinearOperator> {
        (**self).derivative(params)
    }
}

impl<M: Mapping + ?Sized> Mapping for Box<M> {
    fn name(&self) -> &str {
        (**self).name()
    }
    fn n_params(&self) -> usize {
        (**self).n_params()
    }
    fn n_out(&self) -> usize {
        (**self).n_out()
    }
    fn forward(&self, params: &[f64]) -> Result<Vec<f64>> {
        (**self).forward(params)
    }
    fn derivative(&self, params: &[f64]) -> Result<LinearOperator> {
        (**self).derivative(params)
    }
}

/// Composition helpers available on every map
pub trait MappingExt: Mapping + Sized + 'static {
    /// Apply `self` first and `next` to its output
    fn then<M: Mapping + 'static>(self, next: M) -> Result<ComboMap> {
        let first: Arc<dyn Mapping> = Arc::new(self);
        let second: Arc<dyn Mapping> = Arc::new(next);
        ComboMap::new(vec![first, second])
    }
}

impl<M: Mapping + Sized + 'static> MappingExt for M {}
