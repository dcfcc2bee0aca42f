//! Per-layer and per-connection learning rates.

use crate::error::{self, Error, Result};

/// The pre-training and fine-tuning schedule of a stacked autoencoder.
///
/// Bias sequences have one entry per layer and weight sequences one entry per
/// connection (layer pair). The field order is the persisted order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningRates {
    pub(crate) pre_bias_rates: Vec<f64>,
    pub(crate) pre_weight_rates: Vec<f64>,
    pub(crate) pre_bias_momenta: Vec<f64>,
    pub(crate) pre_weight_momenta: Vec<f64>,
    pub(crate) fine_bias_rates: Vec<f64>,
    pub(crate) fine_weight_rates: Vec<f64>,
}

/// Default learning rate of every weight and bias.
pub const DEFAULT_RATE: f64 = 0.001;
/// Default pre-training momentum of every weight and bias.
pub const DEFAULT_MOMENTUM: f64 = 0.5;

impl LearningRates {
    /// Creates the default schedule for a stack of `layers` layers.
    pub fn new(layers: usize) -> Self {
        let connections = layers.saturating_sub(1);
        LearningRates {
            pre_bias_rates: vec![DEFAULT_RATE; layers],
            pre_weight_rates: vec![DEFAULT_RATE; connections],
            pre_bias_momenta: vec![DEFAULT_MOMENTUM; layers],
            pre_weight_momenta: vec![DEFAULT_MOMENTUM; connections],
            fine_bias_rates: vec![DEFAULT_RATE; layers],
            fine_weight_rates: vec![DEFAULT_RATE; connections],
        }
    }

    pub fn pre_training_bias_rate(&self, layer: usize) -> Result<f64> {
        get(&self.pre_bias_rates, layer)
    }

    pub fn pre_training_weight_rate(&self, connection: usize) -> Result<f64> {
        get(&self.pre_weight_rates, connection)
    }

    pub fn pre_training_bias_momentum(&self, layer: usize) -> Result<f64> {
        get(&self.pre_bias_momenta, layer)
    }

    pub fn pre_training_weight_momentum(&self, connection: usize) -> Result<f64> {
        get(&self.pre_weight_momenta, connection)
    }

    pub fn fine_tuning_bias_rate(&self, layer: usize) -> Result<f64> {
        get(&self.fine_bias_rates, layer)
    }

    pub fn fine_tuning_weight_rate(&self, connection: usize) -> Result<f64> {
        get(&self.fine_weight_rates, connection)
    }

    /// Collects the rates the contrastive-divergence rule needs for the
    /// connection leaving layer `pre`.
    ///
    /// The bias entries are those of layer `pre`; the visible and hidden
    /// layers of the pair share them, as they do in a standalone `Rbm`.
    pub fn rbm_rate(&self, pre: usize) -> Result<RbmLearningRate> {
        Ok(RbmLearningRate {
            weight_rate: self.pre_training_weight_rate(pre)?,
            bias_rate: self.pre_training_bias_rate(pre)?,
            weight_momentum: self.pre_training_weight_momentum(pre)?,
            bias_momentum: self.pre_training_bias_momentum(pre)?,
        })
    }

    /// Checks every sequence against a stack of `layers` layers.
    pub(crate) fn validate(&self, layers: usize) -> Result<()> {
        let connections = layers.saturating_sub(1);
        check_len("pre-training bias rates", &self.pre_bias_rates, layers)?;
        check_len("pre-training weight rates", &self.pre_weight_rates, connections)?;
        check_len("pre-training bias momenta", &self.pre_bias_momenta, layers)?;
        check_len("pre-training weight momenta", &self.pre_weight_momenta, connections)?;
        check_len("fine-tuning bias rates", &self.fine_bias_rates, layers)?;
        check_len("fine-tuning weight rates", &self.fine_weight_rates, connections)?;
        Ok(())
    }
}

/// The learning parameters of a single RBM layer pair.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RbmLearningRate {
    pub weight_rate: f64,
    pub bias_rate: f64,
    pub weight_momentum: f64,
    pub bias_momentum: f64,
}

impl Default for RbmLearningRate {
    fn default() -> Self {
        RbmLearningRate {
            weight_rate: DEFAULT_RATE,
            bias_rate: DEFAULT_RATE,
            weight_momentum: DEFAULT_MOMENTUM,
            bias_momentum: DEFAULT_MOMENTUM,
        }
    }
}

fn get(values: &[f64], i: usize) -> Result<f64> {
    values
        .get(i)
        .copied()
        .ok_or_else(|| Error::bounds("learning rate index", i, values.len()))
}

fn check_len(what: &'static str, values: &[f64], expected: usize) -> Result<()> {
    error::same_len(what, values.len(), expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_lengths() {
        let rates = LearningRates::new(3);
        assert_eq!(rates.pre_bias_rates.len(), 3);
        assert_eq!(rates.pre_weight_rates.len(), 2);
        assert_eq!(rates.fine_weight_rates.len(), 2);
        assert!(rates.validate(3).is_ok());
        assert!(rates.validate(4).is_err());
    }

    #[test]
    fn bounds_checked_getters() {
        let rates = LearningRates::new(2);
        assert_eq!(rates.pre_training_bias_rate(1).unwrap(), DEFAULT_RATE);
        assert_eq!(rates.pre_training_weight_momentum(0).unwrap(), DEFAULT_MOMENTUM);
        assert!(rates.pre_training_weight_rate(1).is_err());
        assert!(rates.fine_tuning_bias_rate(2).is_err());
    }

    #[test]
    fn rbm_rate_of_connection() {
        let mut rates = LearningRates::new(3);
        rates.pre_weight_rates[1] = 0.1;
        rates.pre_bias_momenta[1] = 0.9;
        let rate = rates.rbm_rate(1).unwrap();
        assert_eq!(rate.weight_rate, 0.1);
        assert_eq!(rate.bias_momentum, 0.9);
        assert_eq!(rate.bias_rate, DEFAULT_RATE);
        assert!(rates.rbm_rate(2).is_err());
    }
}
