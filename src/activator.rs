//! Neuron types.

use crate::random::RandomSource;

/// The rule a layer uses to turn net input into a neuron's state.
///
/// Persisted as an explicit tag rather than inferred from a type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activator {
    /// Stochastic binary neuron.
    ///
    /// Activity is the [logistic sigmoid](https://en.wikipedia.org/wiki/Logistic_function)
    /// of the input, and the state is `1` with that probability.
    #[serde(rename = "RBMBinaryLayer")]
    Binary,
    /// Continuous linear neuron. State and activity are both the input.
    #[serde(rename = "RBMGaussianLayer")]
    Gaussian,
}

impl Activator {
    /// Evaluates the neuron for the provided `input` (bias included),
    /// returning `(state, activity)`.
    pub fn activate(&self, input: f64, random: &mut dyn RandomSource) -> (f64, f64) {
        match self {
            Activator::Binary => {
                let activity = sigmoid(input);
                let state = if random.uniform() < activity { 1.0 } else { 0.0 };
                (state, activity)
            }
            Activator::Gaussian => (input, input),
        }
    }

    /// Returns true if `activate` never consults the random source.
    pub fn is_deterministic(&self) -> bool {
        match self {
            Activator::Binary => false,
            Activator::Gaussian => true,
        }
    }
}

/// `1 / (1 + e^-x)`
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random;

    #[test]
    fn gaussian_passes_input_through() {
        let mut rng = random::seeded(0);
        assert_eq!(Activator::Gaussian.activate(-1.5, &mut *rng), (-1.5, -1.5));
    }

    #[test]
    fn binary_state_is_zero_or_one() {
        let mut rng = random::seeded(0);
        for i in 0..100 {
            let input = i as f64 / 10.0 - 5.0;
            let (state, activity) = Activator::Binary.activate(input, &mut *rng);
            assert!(state == 0.0 || state == 1.0);
            assert_eq!(activity, sigmoid(input));
        }
    }

    #[test]
    fn sigmoid_midpoint() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(40.0) > 0.999_999);
        assert!(sigmoid(-40.0) < 0.000_001);
    }
}
