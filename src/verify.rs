//! Taylor tests for analytic derivatives
//!
//! For a step `h` along a direction `d` the zeroth-order error
//! `|f(x + h d) - f(x)|` shrinks like `h`, while the first-order error
//! `|f(x + h d) - f(x) - h J d|` shrinks like `h²` when the Jacobian `J` is
//! correct. Halving `h` should therefore reduce the first-order error by a
//! factor close to four, an observed order close to two.
use crate::numeric::{check_len, dot, norm};
use crate::operator::LinearOperator;
use crate::traits::Mapping;
use crate::types::{Error, Result};
use itertools::izip;
use log::info;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

/// Minimum number of step halvings
pub const MIN_HALVINGS: usize = 4;

/// Options for [`check_derivative`]
#[derive(Debug, Clone)]
pub struct DerivativeCheckOptions {
    n_halvings: usize,
    initial_step: f64,
    threshold: f64,
    direction: Option<Vec<f64>>,
    seed: u64,
    noise_floor: f64,
}

impl Default for DerivativeCheckOptions {
    fn default() -> Self {
        Self {
            n_halvings: 8,
            initial_step: 0.1,
            threshold: 1.5,
            direction: None,
            seed: 0,
            noise_floor: 1e-12,
        }
    }
}

impl DerivativeCheckOptions {
    /// Set the number of times the step is halved
    pub fn set_n_halvings(&mut self, n_halvings: usize) {
        self.n_halvings = n_halvings;
    }

    /// Set the first step length
    pub fn set_initial_step(&mut self, initial_step: f64) {
        self.initial_step = initial_step;
    }

    /// Set the order the mean observed order must exceed
    pub fn set_threshold(&mut self, threshold: f64) {
        self.threshold = threshold;
    }

    /// Use a fixed perturbation direction instead of a random one
    pub fn set_direction(&mut self, direction: Vec<f64>) {
        self.direction = Some(direction);
    }

    /// Set the seed of the random direction
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    /// Set the error level, relative to `max(1, |f(x)|)`, treated as round-off
    pub fn set_noise_floor(&mut self, noise_floor: f64) {
        self.noise_floor = noise_floor;
    }

    /// Number of times the step is halved
    pub fn n_halvings(&self) -> usize {
        self.n_halvings
    }

    /// First step length
    pub fn initial_step(&self) -> f64 {
        self.initial_step
    }

    /// Order the mean observed order must exceed
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    fn validate(&self) -> Result<()> {
        if self.n_halvings < MIN_HALVINGS {
            return Err(Error::Configuration(format!(
                "A derivative check needs at least {MIN_HALVINGS} halvings, got {}",
                self.n_halvings
            )));
        }
        if !self.initial_step.is_finite() || self.initial_step <= 0.0 {
            return Err(Error::Configuration(format!(
                "Initial step must be positive and finite, got {}",
                self.initial_step
            )));
        }
        Ok(())
    }

    fn direction(&self, n: usize) -> Result<Vec<f64>> {
        match &self.direction {
            Some(direction) => {
                check_len("Derivative check direction", n, direction)?;
                Ok(direction.clone())
            }
            None => {
                let mut rng = StdRng::seed_from_u64(self.seed);
                Ok(random_vector(n, &mut rng))
            }
        }
    }
}

/// One step of a derivative check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceRow {
    /// Step length
    pub step: f64,
    /// `|f(x + h d) - f(x)|`
    pub zeroth_order: f64,
    /// `|f(x + h d) - f(x) - h J d|`
    pub first_order: f64,
    /// Order observed between the previous step and this one
    pub order: Option<f64>,
}

/// Outcome of a derivative check
#[derive(Debug, Clone)]
pub struct ConvergenceReport {
    rows: Vec<ConvergenceRow>,
    mean_order: Option<f64>,
    threshold: f64,
    passed: bool,
}

impl ConvergenceReport {
    /// One row per step, largest step first
    pub fn rows(&self) -> &[ConvergenceRow] {
        &self.rows
    }

    /// Mean of the observed orders above the noise floor, if there are any
    pub fn mean_order(&self) -> Option<f64> {
        self.mean_order
    }

    /// Whether the check passed
    pub fn passed(&self) -> bool {
        self.passed
    }
}

impl fmt::Display for ConvergenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>14} {:>14} {:>8}",
            "h", "|f1 - f0|", "|f1 - f0 - hJd|", "order"
        )?;
        for row in &self.rows {
            let order = row
                .order
                .map_or_else(|| "-".to_string(), |o| format!("{o:.3}"));
            writeln!(
                f,
                "{:>12.4e} {:>14.4e} {:>14.4e} {:>8}",
                row.step, row.zeroth_order, row.first_order, order
            )?;
        }
        match self.mean_order {
            Some(order) => write!(
                f,
                "Mean order {order:.3} (threshold {:.3}): {}",
                self.threshold,
                if self.passed { "passed" } else { "failed" }
            ),
            None => write!(
                f,
                "First-order error at round-off level: {}",
                if self.passed { "passed" } else { "failed" }
            ),
        }
    }
}

/// Check the derivative returned by `f` at `x0`
///
/// `f` returns the value and the Jacobian at a point. Returns the report if
/// the observed order exceeds the threshold and
/// [`Error::DerivativeMismatch`] otherwise.
pub fn check_derivative<F>(
    f: F,
    x0: &[f64],
    options: &DerivativeCheckOptions,
) -> Result<ConvergenceReport>
where
    F: Fn(&[f64]) -> Result<(Vec<f64>, LinearOperator)>,
{
    options.validate()?;
    let (f0, jacobian) = f(x0)?;
    taylor_test(|x| Ok(f(x)?.0), x0, &f0, &jacobian, options)
}

/// Check the derivative of `map` at `x0`
pub fn check_map_derivative<M: Mapping + ?Sized>(
    map: &M,
    x0: &[f64],
    options: &DerivativeCheckOptions,
) -> Result<ConvergenceReport> {
    options.validate()?;
    map.check_params(x0)?;
    let f0 = map.forward(x0)?;
    let jacobian = map.derivative(x0)?;
    taylor_test(|x| map.forward(x), x0, &f0, &jacobian, options)
}

fn taylor_test<F>(
    value: F,
    x0: &[f64],
    f0: &[f64],
    jacobian: &LinearOperator,
    options: &DerivativeCheckOptions,
) -> Result<ConvergenceReport>
where
    F: Fn(&[f64]) -> Result<Vec<f64>>,
{
    let direction = options.direction(x0.len())?;
    let jd = jacobian.apply(&direction)?;
    check_len("Derivative check value", jd.len(), f0)?;
    let floor = options.noise_floor * norm(f0).max(1.0);

    let mut rows: Vec<ConvergenceRow> = Vec::with_capacity(options.n_halvings);
    let mut x = vec![0.0; x0.len()];
    let mut step = options.initial_step;
    for _ in 0..options.n_halvings {
        for (xi, x0i, di) in izip!(x.iter_mut(), x0.iter(), direction.iter()) {
            *xi = x0i + step * di;
        }
        let f1 = value(&x)?;
        check_len("Derivative check value", f0.len(), &f1)?;
        let (mut zeroth, mut first) = (0.0, 0.0);
        for (a, b, c) in izip!(f1.iter(), f0.iter(), jd.iter()) {
            let diff = a - b;
            zeroth += diff * diff;
            first += (diff - step * c) * (diff - step * c);
        }
        let first_order = first.sqrt();
        let order = match rows.last() {
            Some(previous) if previous.first_order > floor && first_order > floor => {
                Some((previous.first_order / first_order).log10() / 2.0_f64.log10())
            }
            _ => None,
        };
        rows.push(ConvergenceRow {
            step,
            zeroth_order: zeroth.sqrt(),
            first_order,
            order,
        });
        step *= 0.5;
    }

    let orders = rows.iter().filter_map(|r| r.order).collect::<Vec<_>>();
    let mean_order = if orders.is_empty() {
        None
    } else {
        Some(orders.iter().sum::<f64>() / orders.len() as f64)
    };
    let passed = match mean_order {
        Some(order) => order > options.threshold,
        None => rows.iter().all(|r| r.first_order <= floor),
    };
    let report = ConvergenceReport {
        rows,
        mean_order,
        threshold: options.threshold,
        passed,
    };
    info!("Derivative check\n{report}");
    if passed {
        Ok(report)
    } else {
        Err(Error::DerivativeMismatch {
            order: mean_order.unwrap_or(0.0),
            threshold: options.threshold,
        })
    }
}

/// Compare `<A v, w>` with `<v, A^T w>` for random `v` and `w`
///
/// Returns the gap relative to the larger of the two products.
pub fn check_adjoint<R: Rng>(op: &LinearOperator, rng: &mut R) -> Result<f64> {
    let [nrows, ncols] = op.shape();
    let v = random_vector(ncols, rng);
    let w = random_vector(nrows, rng);
    let forward = dot(&op.apply(&v)?, &w);
    let adjoint = dot(&v, &op.apply_adjoint(&w)?);
    let scale = forward.abs().max(adjoint.abs());
    if scale == 0.0 {
        Ok(0.0)
    } else {
        Ok((forward - adjoint).abs() / scale)
    }
}

fn random_vector<R: Rng>(n: usize, rng: &mut R) -> Vec<f64> {
    let between = Uniform::from(-1.0..1.0);
    (0..n).map(|_| between.sample(rng)).collect()
}
