//! Sources of randomness for stochastic neurons and weight initialization.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// The two draws the training algorithms need.
///
/// Implemented for every `rand::Rng`, so a seeded `StdRng` can be handed to a
/// model wherever reproducible results are wanted.
pub trait RandomSource {
    /// Draws a value uniformly from `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// Draws a value from a normal distribution.
    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        let z: f64 = self.sample(StandardNormal);
        mean + std_dev * z
    }
}

/// Returns an entropy-seeded generator, the default for new models.
pub fn default_source() -> Box<dyn RandomSource> {
    Box::new(StdRng::from_entropy())
}

/// Returns a boxed generator with a fixed seed.
pub fn seeded(seed: u64) -> Box<dyn RandomSource> {
    Box::new(StdRng::seed_from_u64(seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_stays_in_unit_interval() {
        let mut rng = seeded(3);
        for _ in 0..10_000 {
            let x = rng.uniform();
            assert!(x >= 0.0 && x < 1.0);
        }
    }

    #[test]
    fn gaussian_moments() {
        let mut rng = seeded(11);
        let n = 20_000;
        let samples: Vec<f64> = (0..n).map(|_| rng.gaussian(2.0, 0.5)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n as f64;
        assert!((mean - 2.0).abs() < 0.02);
        assert!((var.sqrt() - 0.5).abs() < 0.02);
    }

    #[test]
    fn same_seed_same_draws() {
        let mut a = seeded(5);
        let mut b = seeded(5);
        for _ in 0..16 {
            assert_eq!(a.uniform(), b.uniform());
        }
    }
}
