//! Random models for testing maps
use crate::types::{Error, Result};
use log::debug;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Create a smooth random model on a tensor grid
///
/// Values are drawn uniformly, averaged `smoothing_iterations` times with
/// their nearest neighbours along every axis and finally rescaled linearly
/// onto `bounds`. The first axis runs fastest. The same seed always gives
/// the same model.
pub fn random_model(
    shape: &[usize],
    seed: u64,
    smoothing_iterations: usize,
    bounds: [f64; 2],
) -> Result<Vec<f64>> {
    if shape.is_empty() || shape.len() > 3 {
        return Err(Error::Configuration(format!(
            "Random models need 1 to 3 axes, got {}",
            shape.len()
        )));
    }
    if shape.contains(&0) {
        return Err(Error::Configuration(format!(
            "Random model shape {shape:?} has an empty axis"
        )));
    }
    let [low, high] = bounds;
    if !low.is_finite() || !high.is_finite() || low >= high {
        return Err(Error::Configuration(format!(
            "Invalid bounds [{low}, {high}] for a random model"
        )));
    }

    let n = shape.iter().product::<usize>();
    let mut rng = StdRng::seed_from_u64(seed);
    let between = Uniform::from(-1.0..1.0);
    let mut model = (0..n).map(|_| between.sample(&mut rng)).collect::<Vec<f64>>();

    // Stride of each axis in the flat index
    let strides = shape
        .iter()
        .scan(1, |stride, len| {
            let current = *stride;
            *stride *= len;
            Some(current)
        })
        .collect::<Vec<_>>();
    let mut smoothed = vec![0.0; n];
    for _ in 0..smoothing_iterations {
        for (index, value) in smoothed.iter_mut().enumerate() {
            let mut sum = model[index];
            let mut count = 1.0;
            for (len, stride) in shape.iter().zip(strides.iter()) {
                let position = (index / stride) % len;
                if position > 0 {
                    sum += model[index - stride];
                    count += 1.0;
                }
                if position + 1 < *len {
                    sum += model[index + stride];
                    count += 1.0;
                }
            }
            *value = sum / count;
        }
        std::mem::swap(&mut model, &mut smoothed);
    }

    let (min, max) = model
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    if max > min {
        for value in model.iter_mut() {
            *value = low + (high - low) * (*value - min) / (max - min);
        }
    } else {
        model.fill(0.5 * (low + high));
    }
    debug!("Random model of shape {shape:?} with seed {seed} smoothed {smoothing_iterations} times");
    Ok(model)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bounds_and_reproducibility() {
        let model = random_model(&[8, 6, 4], 3, 5, [-2.0, 5.0]).unwrap();
        assert_eq!(model.len(), 192);
        assert!(model.iter().all(|v| (-2.0..=5.0).contains(v)));
        let min = model.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = model.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert_relative_eq!(min, -2.0, epsilon = 1e-12);
        assert_relative_eq!(max, 5.0, epsilon = 1e-12);
        assert_eq!(model, random_model(&[8, 6, 4], 3, 5, [-2.0, 5.0]).unwrap());
        assert_ne!(model, random_model(&[8, 6, 4], 4, 5, [-2.0, 5.0]).unwrap());
    }

    #[test]
    fn test_smoothing_reduces_roughness() {
        let roughness = |m: &[f64]| m.windows(2).map(|w| (w[1] - w[0]).abs()).sum::<f64>();
        let rough = random_model(&[200], 1, 0, [0.0, 1.0]).unwrap();
        let smooth = random_model(&[200], 1, 10, [0.0, 1.0]).unwrap();
        assert!(roughness(&smooth) < roughness(&rough));
    }

    #[test]
    fn test_invalid_input() {
        assert!(random_model(&[], 0, 1, [0.0, 1.0]).is_err());
        assert!(random_model(&[2, 2, 2, 2], 0, 1, [0.0, 1.0]).is_err());
        assert!(random_model(&[3, 0], 0, 1, [0.0, 1.0]).is_err());
        assert!(random_model(&[3], 0, 1, [1.0, 1.0]).is_err());
        assert_eq!(random_model(&[1], 0, 2, [1.0, 3.0]).unwrap(), vec![2.0]);
    }
}
