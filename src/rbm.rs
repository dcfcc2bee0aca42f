//! A standalone restricted Boltzmann machine.

use crate::contrastive::{self, Accumulator};
use crate::error::{self, Error, Result};
use crate::initializer::WeightInitializer;
use crate::layer::Layer;
use crate::learning_rate::RbmLearningRate;
use crate::random::RandomSource;
use crate::utils;
use crate::weights::WeightSet;

use ndarray::ArrayView1;
use std::fmt;

/// A visible and a hidden layer joined by a single weight set, trained with
/// one-step contrastive divergence.
pub struct Rbm {
    visible: Layer,
    hidden: Layer,
    weights: WeightSet,
    rate: RbmLearningRate,
    data: Accumulator,
    random: Box<dyn RandomSource>,
}

impl Rbm {
    /// Creates a machine over the provided layers. The weights are drawn
    /// from `initializer`; the layers keep the biases they were built with.
    pub fn new(
        visible: Layer,
        hidden: Layer,
        rate: RbmLearningRate,
        initializer: &mut dyn WeightInitializer,
        random: Box<dyn RandomSource>,
    ) -> Result<Self> {
        let weights = WeightSet::new(visible.len(), hidden.len(), initializer)?;
        let data = Accumulator::new(visible.len(), hidden.len());
        Ok(Rbm {
            visible,
            hidden,
            weights,
            rate,
            data,
            random,
        })
    }

    pub fn visible(&self) -> &Layer {
        &self.visible
    }

    pub fn hidden(&self) -> &Layer {
        &self.hidden
    }

    pub fn weights(&self) -> &WeightSet {
        &self.weights
    }

    pub fn learning_rate(&self) -> RbmLearningRate {
        self.rate
    }

    pub fn set_learning_rate(&mut self, rate: RbmLearningRate) {
        self.rate = rate;
    }

    pub fn set_random_source(&mut self, random: Box<dyn RandomSource>) {
        self.random = random;
    }

    /// Trains on a single sample.
    pub fn train_one(&mut self, sample: &[f64]) -> Result<f64> {
        self.train(&[sample])
    }

    /// Runs the positive and negative phase for every sample of `batch`, then
    /// applies one contrastive-divergence update from the averaged phases.
    ///
    /// Returns the mean over samples of the squared error between the
    /// visible activities of the two phases.
    pub fn train<S>(&mut self, batch: &[S]) -> Result<f64>
    where
        S: AsRef<[f64]>,
    {
        if batch.is_empty() {
            return Err(Error::NullInput("no samples to train on"));
        }
        for sample in batch {
            error::same_len("visible data", sample.as_ref().len(), self.visible.len())?;
        }

        self.data.zero();
        let mut total_error = 0.0;
        for sample in batch {
            self.compress_view(ArrayView1::from(sample.as_ref()))?;
            self.data
                .add_positive(self.visible.activities(), self.hidden.activities())?;
            let positive = self.visible.activities().to_owned();

            self.update_visible()?;
            self.update_hidden()?;
            self.data
                .add_negative(self.visible.activities(), self.hidden.activities())?;
            total_error += utils::mean_square_error(positive.view(), self.visible.activities())?;
        }
        self.data.scale(1.0 / batch.len() as f64);
        contrastive::train(
            &mut self.visible,
            &mut self.hidden,
            &self.data,
            &self.rate,
            &mut self.weights,
        )?;
        Ok(total_error / batch.len() as f64)
    }

    /// Clamps the visible layer to `data`, returning the hidden activities.
    pub fn compress(&mut self, data: &[f64]) -> Result<Vec<f64>> {
        self.compress_view(ArrayView1::from(data))?;
        Ok(self.hidden.activities().to_vec())
    }

    /// Clamps the hidden layer to `code`, returning the visible activities.
    pub fn reconstruct(&mut self, code: &[f64]) -> Result<Vec<f64>> {
        self.hidden.clamp(ArrayView1::from(code))?;
        self.reconstruct_current()
    }

    /// Reconstructs the visible layer from the current hidden states.
    pub fn reconstruct_current(&mut self) -> Result<Vec<f64>> {
        self.update_visible()?;
        Ok(self.visible.activities().to_vec())
    }

    fn compress_view(&mut self, data: ArrayView1<f64>) -> Result<()> {
        self.visible.clamp(data)?;
        self.update_hidden()
    }

    fn update_hidden(&mut self) -> Result<()> {
        let net_input = self.weights.forward(self.visible.states());
        self.hidden.activate(&net_input, &mut *self.random)
    }

    fn update_visible(&mut self) -> Result<()> {
        let net_input = self.weights.backward(self.hidden.states());
        self.visible.activate(&net_input, &mut *self.random)
    }
}

impl fmt::Debug for Rbm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rbm")
            .field("visible", &self.visible)
            .field("hidden", &self.hidden)
            .field("weights", &self.weights)
            .field("rate", &self.rate)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initializer::{ConstantInitializer, GaussianInitializer, ZeroInitializer};
    use crate::random;

    use approx::assert_abs_diff_eq;

    fn gaussian_rbm(weight: f64) -> Rbm {
        Rbm::new(
            Layer::gaussian(2).unwrap(),
            Layer::gaussian(1).unwrap(),
            RbmLearningRate::default(),
            &mut ConstantInitializer { weight, bias: 0.0 },
            random::seeded(0),
        )
        .unwrap()
    }

    #[test]
    fn compress_and_reconstruct() {
        let mut rbm = gaussian_rbm(0.5);
        assert_eq!(rbm.compress(&[1.0, 3.0]).unwrap(), vec![2.0]);
        assert_eq!(rbm.reconstruct_current().unwrap(), vec![1.0, 1.0]);
        assert_eq!(rbm.reconstruct(&[4.0]).unwrap(), vec![2.0, 2.0]);
        assert!(rbm.compress(&[1.0]).is_err());
        assert!(rbm.reconstruct(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn empty_batch() {
        let mut rbm = gaussian_rbm(0.5);
        let batch: Vec<Vec<f64>> = Vec::new();
        match rbm.train(&batch) {
            Err(Error::NullInput(_)) => {}
            other => panic!("expected null input, got {:?}", other),
        }
    }

    #[test]
    fn bad_sample_leaves_weights_untouched() {
        let mut rbm = gaussian_rbm(0.5);
        let batch = vec![vec![1.0, 1.0], vec![1.0]];
        assert!(rbm.train(&batch).is_err());
        assert!(rbm.weights().changes().iter().all(|&c| c == 0.0));
    }

    #[test]
    fn zero_machine_reconstructs_zeros() {
        let mut rbm = Rbm::new(
            Layer::gaussian(3).unwrap(),
            Layer::gaussian(2).unwrap(),
            RbmLearningRate::default(),
            &mut ZeroInitializer,
            random::seeded(0),
        )
        .unwrap();
        // Reconstruction is all zeros, so the error is the mean square of the
        // sample itself.
        let error = rbm.train_one(&[1.0, 2.0, 2.0]).unwrap();
        assert_abs_diff_eq!(error, 3.0);
    }

    #[test]
    fn training_reduces_reconstruction_error() {
        let mut init = GaussianInitializer::with_source(random::seeded(17), 0.0, 0.1).unwrap();
        let mut rbm = Rbm::new(
            Layer::gaussian(4).unwrap(),
            Layer::binary(8).unwrap(),
            RbmLearningRate {
                weight_rate: 0.05,
                bias_rate: 0.05,
                weight_momentum: 0.5,
                bias_momentum: 0.5,
            },
            &mut init,
            random::seeded(23),
        )
        .unwrap();
        let batch = vec![
            [1.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 1.0],
            [1.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 1.0],
        ];
        let first = rbm.train(&batch).unwrap();
        let mut last = first;
        for _ in 0..300 {
            last = rbm.train(&batch).unwrap();
        }
        assert!(last < first, "error went from {} to {}", first, last);
    }
}
