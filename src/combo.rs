//! Composition of maps
use crate::operator::LinearOperator;
use crate::traits::Mapping;
use crate::types::{Error, Result};
use log::debug;
use std::sync::Arc;

/// A chain of maps applied first to last
///
/// The output of every stage feeds the next one, so the chain takes the
/// parameters of its first map and returns the model of its last map.
#[derive(Clone)]
pub struct ComboMap {
    maps: Vec<Arc<dyn Mapping>>,
    name: String,
}

impl ComboMap {
    /// Create a chain, checking that the stages fit together
    pub fn new(maps: Vec<Arc<dyn Mapping>>) -> Result<Self> {
        if maps.is_empty() {
            return Err(Error::Configuration(
                "Cannot compose an empty list of maps".to_string(),
            ));
        }
        for (index, pair) in maps.windows(2).enumerate() {
            check_stages(index, pair[0].as_ref(), pair[1].as_ref())?;
        }
        let name = maps
            .iter()
            .map(|m| m.name())
            .collect::<Vec<_>>()
            .join(" -> ");
        debug!("Composed {name}");
        Ok(Self { maps, name })
    }

    /// Append a further stage applied after the current ones
    pub fn then(mut self, next: Arc<dyn Mapping>) -> Result<Self> {
        let index = self.maps.len() - 1;
        check_stages(index, self.maps[index].as_ref(), next.as_ref())?;
        self.name = format!("{} -> {}", self.name, next.name());
        self.maps.push(next);
        Ok(self)
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    /// Whether the chain has no stages; never true for a constructed chain
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// The stages in application order
    pub fn maps(&self) -> &[Arc<dyn Mapping>] {
        &self.maps
    }
}

fn check_stages(index: usize, first: &dyn Mapping, second: &dyn Mapping) -> Result<()> {
    if first.n_out() == second.n_params() {
        Ok(())
    } else {
        Err(Error::Configuration(format!(
            "Stage {index} ({}) returns {} values but stage {} ({}) takes {} parameters",
            first.name(),
            first.n_out(),
            index + 1,
            second.name(),
            second.n_params()
        )))
    }
}

impl Mapping for ComboMap {
    fn name(&self) -> &str {
        &self.name
    }

    fn n_params(&self) -> usize {
        self.maps[0].n_params()
    }

    fn n_out(&self) -> usize {
        self.maps[self.maps.len() - 1].n_out()
    }

    fn forward(&self, params: &[f64]) -> Result<Vec<f64>> {
        self.check_params(params)?;
        let mut value = self.maps[0].forward(params)?;
        for map in &self.maps[1..] {
            value = map.forward(&value)?;
        }
        Ok(value)
    }

    fn derivative(&self, params: &[f64]) -> Result<LinearOperator> {
        self.check_params(params)?;
        let mut ops = Vec::with_capacity(self.maps.len());
        let mut point = params.to_vec();
        for (index, map) in self.maps.iter().enumerate() {
            ops.push(map.derivative(&point)?);
            if index + 1 < self.maps.len() {
                point = map.forward(&point)?;
            }
        }
        if ops.len() == 1 {
            Ok(ops.remove(0))
        } else {
            LinearOperator::chain(ops)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::maps::{ExpMap, IdentityMap, LinearMap};
    use crate::traits::MappingExt;
    use approx::assert_relative_eq;

    fn stage<M: Mapping + 'static>(map: M) -> Arc<dyn Mapping> {
        Arc::new(map)
    }

    fn linear() -> Arc<dyn Mapping> {
        stage(LinearMap::from_rows(&[vec![1.0, 2.0], vec![0.0, 1.0], vec![3.0, 0.0]]).unwrap())
    }

    #[test]
    fn test_forward_threads_stages() {
        let combo = ComboMap::new(vec![linear(), stage(ExpMap::new(3))]).unwrap();
        assert_eq!(combo.len(), 2);
        assert_eq!(combo.n_params(), 2);
        assert_eq!(combo.n_out(), 3);
        let out = combo.forward(&[0.5, -0.25]).unwrap();
        assert_relative_eq!(out[0], 0.0_f64.exp());
        assert_relative_eq!(out[1], (-0.25_f64).exp());
        assert_relative_eq!(out[2], 1.5_f64.exp());
    }

    #[test]
    fn test_derivative_is_chain_rule() {
        let combo = ComboMap::new(vec![linear(), stage(ExpMap::new(3))]).unwrap();
        let x = [0.5, -0.25];
        let j = combo.derivative(&x).unwrap();
        assert_eq!(j.shape(), [3, 2]);
        // d exp(A x) / dx = diag(exp(A x)) A
        let column = j.apply(&[0.0, 1.0]).unwrap();
        assert_relative_eq!(column[0], 2.0 * 0.0_f64.exp());
        assert_relative_eq!(column[1], (-0.25_f64).exp());
        assert_relative_eq!(column[2], 0.0);
        let row = j.apply_adjoint(&[0.0, 0.0, 1.0]).unwrap();
        assert_relative_eq!(row[0], 3.0 * 1.5_f64.exp());
        assert_relative_eq!(row[1], 0.0);
    }

    #[test]
    fn test_single_stage() {
        let combo = ComboMap::new(vec![stage(ExpMap::new(2))]).unwrap();
        assert_eq!(combo.forward(&[0.0, 1.0]).unwrap(), vec![1.0, 1.0_f64.exp()]);
        assert!(matches!(
            combo.derivative(&[0.0, 1.0]).unwrap(),
            LinearOperator::Diagonal(_)
        ));
    }

    #[test]
    fn test_configuration_errors() {
        assert!(matches!(ComboMap::new(vec![]), Err(Error::Configuration(_))));
        match ComboMap::new(vec![linear(), stage(IdentityMap::new(2))]) {
            Ok(_) => panic!("Mismatched stages accepted"),
            Err(Error::Configuration(message)) => {
                assert!(message.contains("Stage 0 (LinearMap) returns 3 values"));
                assert!(message.contains("stage 1 (IdentityMap) takes 2 parameters"));
            }
            Err(e) => panic!("Unexpected error {e}"),
        }
        let combo = ComboMap::new(vec![linear()]).unwrap();
        assert!(combo.clone().then(stage(ExpMap::new(2))).is_err());
        let combo = combo.then(stage(ExpMap::new(3))).unwrap();
        assert_eq!(combo.name(), "LinearMap -> ExpMap");
        assert!(matches!(
            combo.forward(&[1.0]),
            Err(Error::ParameterShape { .. })
        ));
    }

    #[test]
    fn test_extension_then() {
        let combo = ExpMap::new(2).then(IdentityMap::new(2)).unwrap();
        assert_eq!(combo.forward(&[0.0, 0.0]).unwrap(), vec![1.0, 1.0]);
    }
}
