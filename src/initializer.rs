//! Initial values for weights and biases.

use crate::error::{Error, Result};
use crate::random::{self, RandomSource};

/// Supplies the starting value of every weight and bias in a new model.
pub trait WeightInitializer {
    fn initialize_weight(&mut self) -> f64;
    fn initialize_bias(&mut self) -> f64;
}

/// Draws weights and biases from a normal distribution.
pub struct GaussianInitializer {
    source: Box<dyn RandomSource>,
    mean: f64,
    std_dev: f64,
}

impl GaussianInitializer {
    /// Creates an initializer drawing from `N(mean, std_dev^2)` with an
    /// entropy-seeded generator.
    pub fn new(mean: f64, std_dev: f64) -> Result<Self> {
        Self::with_source(random::default_source(), mean, std_dev)
    }

    /// Creates an initializer drawing from the provided `source`.
    pub fn with_source(source: Box<dyn RandomSource>, mean: f64, std_dev: f64) -> Result<Self> {
        if !mean.is_finite() || !std_dev.is_finite() || std_dev < 0.0 {
            return Err(Error::InvalidArgument(
                "gaussian initializer needs a finite mean and a finite, non-negative std-dev",
            ));
        }
        Ok(GaussianInitializer {
            source,
            mean,
            std_dev,
        })
    }
}

impl Default for GaussianInitializer {
    /// `N(0, 0.01)`, with an entropy-seeded generator.
    fn default() -> Self {
        GaussianInitializer {
            source: random::default_source(),
            mean: 0.0,
            std_dev: 0.1,
        }
    }
}

impl WeightInitializer for GaussianInitializer {
    fn initialize_weight(&mut self) -> f64 {
        self.source.gaussian(self.mean, self.std_dev)
    }

    fn initialize_bias(&mut self) -> f64 {
        self.source.gaussian(self.mean, self.std_dev)
    }
}

/// Initializes everything to zero. Used when duplicating weights without
/// drawing fresh randomness.
#[derive(Copy, Clone, Debug, Default)]
pub struct ZeroInitializer;

impl WeightInitializer for ZeroInitializer {
    fn initialize_weight(&mut self) -> f64 {
        0.0
    }

    fn initialize_bias(&mut self) -> f64 {
        0.0
    }
}

/// Initializes every weight to one value and every bias to another.
#[derive(Copy, Clone, Debug)]
pub struct ConstantInitializer {
    pub weight: f64,
    pub bias: f64,
}

impl WeightInitializer for ConstantInitializer {
    fn initialize_weight(&mut self) -> f64 {
        self.weight
    }

    fn initialize_bias(&mut self) -> f64 {
        self.bias
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_std_dev() {
        assert!(GaussianInitializer::new(0.0, -1.0).is_err());
        assert!(GaussianInitializer::new(0.0, f64::NAN).is_err());
        assert!(GaussianInitializer::new(f64::INFINITY, 1.0).is_err());
    }

    #[test]
    fn zero_std_dev_is_constant() {
        let mut init = GaussianInitializer::with_source(random::seeded(1), 0.25, 0.0).unwrap();
        assert_eq!(init.initialize_weight(), 0.25);
        assert_eq!(init.initialize_bias(), 0.25);
    }

    #[test]
    fn seeded_gaussian_is_reproducible() {
        let mut a = GaussianInitializer::with_source(random::seeded(9), 0.0, 0.1).unwrap();
        let mut b = GaussianInitializer::with_source(random::seeded(9), 0.0, 0.1).unwrap();
        for _ in 0..8 {
            assert_eq!(a.initialize_weight(), b.initialize_weight());
        }
    }
}
