//! Configuration of new autoencoders.

use crate::activator::Activator;
use crate::autoencoder::Autoencoder;
use crate::error::{Error, Result};
use crate::initializer::{GaussianInitializer, WeightInitializer};
use crate::layer::Layer;
use crate::learning_rate::LearningRates;
use crate::random::{self, RandomSource};

#[derive(Copy, Clone, Debug, PartialEq)]
enum Schedule {
    PreTrainingBiasRate,
    PreTrainingWeightRate,
    PreTrainingBiasMomentum,
    PreTrainingWeightMomentum,
    FineTuningBiasRate,
    FineTuningWeightRate,
}

impl Schedule {
    fn describe(self) -> &'static str {
        match self {
            Schedule::PreTrainingBiasRate => "pre-training bias rate index",
            Schedule::PreTrainingWeightRate => "pre-training weight rate index",
            Schedule::PreTrainingBiasMomentum => "pre-training bias momentum index",
            Schedule::PreTrainingWeightMomentum => "pre-training weight momentum index",
            Schedule::FineTuningBiasRate => "fine-tuning bias rate index",
            Schedule::FineTuningWeightRate => "fine-tuning weight rate index",
        }
    }

    fn values(self, rates: &mut LearningRates) -> &mut Vec<f64> {
        match self {
            Schedule::PreTrainingBiasRate => &mut rates.pre_bias_rates,
            Schedule::PreTrainingWeightRate => &mut rates.pre_weight_rates,
            Schedule::PreTrainingBiasMomentum => &mut rates.pre_bias_momenta,
            Schedule::PreTrainingWeightMomentum => &mut rates.pre_weight_momenta,
            Schedule::FineTuningBiasRate => &mut rates.fine_bias_rates,
            Schedule::FineTuningWeightRate => &mut rates.fine_weight_rates,
        }
    }
}

/// Builds a new `Autoencoder`.
///
/// Layers are listed bottom-up, starting with the input layer. Every layer
/// starts with a pre-training bias rate of 0.001, a bias momentum of 0.5 and a
/// fine-tuning bias rate of 0.001; every connection with the same values for
/// its weights. Weights and biases are drawn from `N(0, 0.1^2)` unless another
/// initializer is provided.
///
/// ```
/// # use autoencoder::AutoencoderBuilder;
/// let model = AutoencoderBuilder::new()
///     .gaussian_layer(6)
///     .binary_layer(3)
///     .pretraining_weight_rate(0, 0.01)
///     .build()
///     .unwrap();
/// assert_eq!(model.num_layers(), 2);
/// assert!(model.is_pretraining());
/// ```
pub struct AutoencoderBuilder {
    layers: Vec<(Activator, usize)>,
    overrides: Vec<(Schedule, usize, f64)>,
    initializer: Option<Box<dyn WeightInitializer>>,
    random: Option<Box<dyn RandomSource>>,
}

impl AutoencoderBuilder {
    pub fn new() -> Self {
        AutoencoderBuilder {
            layers: Vec::new(),
            overrides: Vec::new(),
            initializer: None,
            random: None,
        }
    }

    /// Appends a layer of stochastic binary neurons.
    pub fn binary_layer(mut self, neurons: usize) -> Self {
        self.layers.push((Activator::Binary, neurons));
        self
    }

    /// Appends a layer of continuous Gaussian neurons.
    pub fn gaussian_layer(mut self, neurons: usize) -> Self {
        self.layers.push((Activator::Gaussian, neurons));
        self
    }

    pub fn pretraining_bias_rate(self, layer: usize, rate: f64) -> Self {
        self.set(Schedule::PreTrainingBiasRate, layer, rate)
    }

    pub fn pretraining_weight_rate(self, connection: usize, rate: f64) -> Self {
        self.set(Schedule::PreTrainingWeightRate, connection, rate)
    }

    pub fn pretraining_bias_momentum(self, layer: usize, momentum: f64) -> Self {
        self.set(Schedule::PreTrainingBiasMomentum, layer, momentum)
    }

    pub fn pretraining_weight_momentum(self, connection: usize, momentum: f64) -> Self {
        self.set(Schedule::PreTrainingWeightMomentum, connection, momentum)
    }

    pub fn finetuning_bias_rate(self, layer: usize, rate: f64) -> Self {
        self.set(Schedule::FineTuningBiasRate, layer, rate)
    }

    pub fn finetuning_weight_rate(self, connection: usize, rate: f64) -> Self {
        self.set(Schedule::FineTuningWeightRate, connection, rate)
    }

    /// Sets the source of the initial weights and biases.
    pub fn initializer<I>(mut self, initializer: I) -> Self
    where
        I: WeightInitializer + 'static,
    {
        self.initializer = Some(Box::new(initializer));
        self
    }

    /// Sets the generator used to sample binary neurons. Defaults to an
    /// entropy-seeded `StdRng`.
    pub fn random_source(mut self, random: Box<dyn RandomSource>) -> Self {
        self.random = Some(random);
        self
    }

    /// Creates the autoencoder, failing if fewer than two layers were added,
    /// a layer is empty, or a rate override names a missing layer or
    /// connection.
    pub fn build(self) -> Result<Autoencoder> {
        if self.layers.len() < 2 {
            return Err(Error::InvalidArgument(
                "an autoencoder needs at least two layers",
            ));
        }
        let layers = self
            .layers
            .iter()
            .map(|&(activator, neurons)| Layer::new(activator, neurons))
            .collect::<Result<Vec<_>>>()?;

        let mut rates = LearningRates::new(layers.len());
        for &(schedule, index, value) in &self.overrides {
            let values = schedule.values(&mut rates);
            let len = values.len();
            match values.get_mut(index) {
                Some(slot) => *slot = value,
                None => return Err(Error::bounds(schedule.describe(), index, len)),
            }
        }

        let mut initializer = match self.initializer {
            Some(initializer) => initializer,
            None => Box::new(GaussianInitializer::default()),
        };
        let random = self.random.unwrap_or_else(random::default_source);
        Autoencoder::new(layers, rates, &mut *initializer, random)
    }

    fn set(mut self, schedule: Schedule, index: usize, value: f64) -> Self {
        self.overrides.push((schedule, index, value));
        self
    }
}

impl Default for AutoencoderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
