//! Identity map
use crate::operator::LinearOperator;
use crate::traits::Mapping;
use crate::types::Result;

/// Map returning its input unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityMap {
    n: usize,
}

impl IdentityMap {
    /// Create an identity map on vectors of length `n`
    pub fn new(n: usize) -> Self {
        Self { n }
    }
}

impl Mapping for IdentityMap {
    fn name(&self) -> &str {
        "IdentityMap"
    }
    fn n_params(&self) -> usize {
        self.n
    }
    fn n_out(&self) -> usize {
        self.n
    }
    fn forward(&self, params: &[f64]) -> Result<Vec<f64>> {
        self.check_params(params)?;
        Ok(params.to_vec())
    }
    fn derivative(&self, params: &[f64]) -> Result<LinearOperator> {
        self.check_params(params)?;
        Ok(LinearOperator::Identity(self.n))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::Error;

    #[test]
    fn test_identity() {
        let map = IdentityMap::new(3);
        let m = [1.0, -2.0, 3.5];
        assert_eq!(map.forward(&m).unwrap(), m.to_vec());
        let d = map.derivative(&m).unwrap();
        assert_eq!(d.apply(&[0.1, 0.2, 0.3]).unwrap(), vec![0.1, 0.2, 0.3]);
        assert!(matches!(
            map.forward(&[1.0]),
            Err(Error::ParameterShape {
                expected: 3,
                actual: 1,
                ..
            })
        ));
    }
}
