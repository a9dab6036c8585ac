//! Injection of active-cell models into the full mesh
use crate::mesh::ActiveCells;
use crate::operator::{LinearOperator, Selection};
use crate::traits::Mapping;
use crate::types::{Error, Result};

/// Values given to inactive cells
#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    /// The same value in every inactive cell
    Constant(f64),
    /// One value per inactive cell, or one value per mesh cell of which only
    /// the inactive entries are used
    PerCell(Vec<f64>),
}

/// Map a model on the active cells to the full mesh
pub struct InjectActiveCells {
    active: ActiveCells,
    // Full-length vector holding the background, zero on active cells
    base: Vec<f64>,
    rows: Selection,
}

impl InjectActiveCells {
    /// Create the map for the mask `active`
    pub fn new(active: ActiveCells, background: Background) -> Result<Self> {
        let n_cells = active.len();
        let n_inactive = n_cells - active.n_active();
        let mut base = vec![0.0; n_cells];
        match background {
            Background::Constant(value) => {
                for (b, a) in base.iter_mut().zip(active.mask().iter()) {
                    if !a {
                        *b = value;
                    }
                }
            }
            Background::PerCell(values) if values.len() == n_cells => {
                for ((b, a), v) in base.iter_mut().zip(active.mask().iter()).zip(values) {
                    if !a {
                        *b = v;
                    }
                }
            }
            Background::PerCell(values) if values.len() == n_inactive => {
                let inactive = base
                    .iter_mut()
                    .zip(active.mask().iter())
                    .filter_map(|(b, a)| if *a { None } else { Some(b) });
                for (b, v) in inactive.zip(values) {
                    *b = v;
                }
            }
            Background::PerCell(values) => {
                return Err(Error::Configuration(format!(
                    "Background has {} values, expected {n_inactive} inactive cells or {n_cells} cells",
                    values.len()
                )));
            }
        }

        let mut rows = vec![None; n_cells];
        for (k, cell) in active.indices().iter().enumerate() {
            rows[*cell] = Some(k);
        }

        Ok(Self {
            rows: Selection::new(active.n_active(), rows)?,
            active,
            base,
        })
    }

    /// The active-cell mask
    pub fn active_cells(&self) -> &ActiveCells {
        &self.active
    }
}

impl Mapping for InjectActiveCells {
    fn name(&self) -> &str {
        "InjectActiveCells"
    }
    fn n_params(&self) -> usize {
        self.active.n_active()
    }
    fn n_out(&self) -> usize {
        self.active.len()
    }
    fn forward(&self, params: &[f64]) -> Result<Vec<f64>> {
        self.check_params(params)?;
        let mut out = self.base.clone();
        for (cell, value) in self.active.indices().iter().zip(params.iter()) {
            out[*cell] = *value;
        }
        Ok(out)
    }
    fn derivative(&self, params: &[f64]) -> Result<LinearOperator> {
        self.check_params(params)?;
        Ok(LinearOperator::Selection(self.rows.clone()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn mask() -> ActiveCells {
        ActiveCells::new(vec![true, false, true, false, true], 5).unwrap()
    }

    #[test]
    fn test_constant_background() {
        let map = InjectActiveCells::new(mask(), Background::Constant(-1.0)).unwrap();
        assert_eq!(map.n_params(), 3);
        assert_eq!(map.n_out(), 5);
        assert_eq!(
            map.forward(&[1.0, 2.0, 3.0]).unwrap(),
            vec![1.0, -1.0, 2.0, -1.0, 3.0]
        );
        let d = map.derivative(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(
            d.apply(&[1.0, 1.0, 1.0]).unwrap(),
            vec![1.0, 0.0, 1.0, 0.0, 1.0]
        );
        assert_eq!(
            d.apply_adjoint(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap(),
            vec![1.0, 3.0, 5.0]
        );
    }

    #[test]
    fn test_per_cell_background() {
        let map =
            InjectActiveCells::new(mask(), Background::PerCell(vec![7.0, 8.0])).unwrap();
        assert_eq!(
            map.forward(&[0.0; 3]).unwrap(),
            vec![0.0, 7.0, 0.0, 8.0, 0.0]
        );
        let map = InjectActiveCells::new(
            mask(),
            Background::PerCell(vec![9.0, 7.0, 9.0, 8.0, 9.0]),
        )
        .unwrap();
        assert_eq!(
            map.forward(&[0.0; 3]).unwrap(),
            vec![0.0, 7.0, 0.0, 8.0, 0.0]
        );
        assert!(InjectActiveCells::new(mask(), Background::PerCell(vec![1.0])).is_err());
    }
}
