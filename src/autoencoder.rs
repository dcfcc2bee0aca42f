//! A stacked RBM [autoencoder](https://en.wikipedia.org/wiki/Autoencoder).
//!
//! Training happens in two phases. During pre-training every adjacent layer
//! pair is trained bottom-up as an independent RBM, using the recognition
//! weights of the pairs below it to project the data up to it. Calling
//! `pre_training_complete` copies the recognition weights into the
//! generative stack and switches the model to fine-tuning, in which the
//! wake-sleep algorithm adjusts both stacks jointly. The switch is one-way.

use crate::contrastive::{self, Accumulator};
use crate::error::{self, Error, Result};
use crate::initializer::WeightInitializer;
use crate::layer::Layer;
use crate::learning_rate::LearningRates;
use crate::observer::ErrorObserver;
use crate::random::RandomSource;
use crate::utils;
use crate::weights::WeightStack;

use log::{debug, info, trace};
use ndarray::{Array1, ArrayView1};
use std::fmt;

/// A stack of RBM layers with separate recognition (encoder) and generative
/// (decoder) weights.
pub struct Autoencoder {
    layers: Vec<Layer>,
    rates: LearningRates,
    recognition: WeightStack,
    generative: WeightStack,
    /// One per adjacent layer pair, reset at the start of every batch.
    accumulators: Vec<Accumulator>,
    pretraining: bool,
    observers: Vec<Box<dyn ErrorObserver>>,
    random: Box<dyn RandomSource>,
}

impl Autoencoder {
    /// Creates an untrained autoencoder. Use `AutoencoderBuilder` instead.
    pub(crate) fn new(
        mut layers: Vec<Layer>,
        rates: LearningRates,
        initializer: &mut dyn WeightInitializer,
        random: Box<dyn RandomSource>,
    ) -> Result<Self> {
        if layers.len() < 2 {
            return Err(Error::InvalidArgument(
                "an autoencoder needs at least two layers",
            ));
        }
        rates.validate(layers.len())?;
        let recognition = WeightStack::new(&layers, initializer)?;
        for layer in &mut layers {
            for i in 0..layer.len() {
                layer.set_bias(i, initializer.initialize_bias())?;
            }
        }
        let generative = recognition.clone();
        Ok(Self::from_parts(
            layers,
            rates,
            recognition,
            generative,
            true,
            random,
        ))
    }

    /// Assembles a model from already-consistent parts, deriving the
    /// transient buffers.
    pub(crate) fn from_parts(
        layers: Vec<Layer>,
        rates: LearningRates,
        recognition: WeightStack,
        generative: WeightStack,
        pretraining: bool,
        random: Box<dyn RandomSource>,
    ) -> Self {
        let accumulators = layers
            .windows(2)
            .map(|pair| Accumulator::new(pair[0].len(), pair[1].len()))
            .collect();
        Autoencoder {
            layers,
            rates,
            recognition,
            generative,
            accumulators,
            pretraining,
            observers: Vec::new(),
            random,
        }
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn layer(&self, i: usize) -> Result<&Layer> {
        self.layers
            .get(i)
            .ok_or_else(|| Error::bounds("layer index", i, self.layers.len()))
    }

    pub(crate) fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Returns the size of the input layer.
    pub fn input_len(&self) -> usize {
        self.layers[0].len()
    }

    /// Returns the size of the code (top) layer.
    pub fn code_len(&self) -> usize {
        self.layers[self.layers.len() - 1].len()
    }

    pub fn recognition_weights(&self) -> &WeightStack {
        &self.recognition
    }

    pub fn generative_weights(&self) -> &WeightStack {
        &self.generative
    }

    pub fn learning_rates(&self) -> &LearningRates {
        &self.rates
    }

    /// Returns true until `pre_training_complete` has been called.
    pub fn is_pretraining(&self) -> bool {
        self.pretraining
    }

    /// Replaces the generator used to sample binary neurons.
    pub fn set_random_source(&mut self, random: Box<dyn RandomSource>) {
        self.random = random;
    }

    pub fn add_error_observer<O>(&mut self, observer: O)
    where
        O: ErrorObserver + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn clear_error_observers(&mut self) {
        self.observers.clear();
    }

    /// Pre-trains the connection between `layer` and `layer + 1` on a single
    /// sample.
    pub fn pretrain_one(&mut self, layer: usize, sample: &[f64]) -> Result<f64> {
        self.pretrain(layer, &[sample], 1)
    }

    /// Pre-trains the connection between `layer` and `layer + 1`.
    ///
    /// `samples` are raw inputs to layer 0; they are projected up to `layer`
    /// through the recognition weights below it. They are then split into
    /// batches of `batch_size` in their original order, the last batch
    /// holding whatever remains. Each batch produces one contrastive
    /// divergence update and one error report.
    ///
    /// Returns the mean of the reported errors.
    pub fn pretrain<S>(&mut self, layer: usize, samples: &[S], batch_size: usize) -> Result<f64>
    where
        S: AsRef<[f64]>,
    {
        if !self.pretraining {
            return Err(Error::UsageSequence(
                "pre-training is complete, the model can't be pre-trained anymore",
            ));
        }
        error::within_bounds("layer to pre-train", layer, 0, self.layers.len() - 1)?;
        if samples.is_empty() {
            return Err(Error::NullInput("no samples to pre-train on"));
        }
        error::within_bounds("pre-training batch size", batch_size, 1, samples.len() + 1)?;
        self.check_inputs(samples)?;

        let mut projected = Vec::with_capacity(samples.len());
        for sample in samples {
            projected.push(self.calculate_to_layer(ArrayView1::from(sample.as_ref()), layer)?);
        }

        let rate = self.rates.rbm_rate(layer)?;
        let mut total_error = 0.0;
        let mut batches = 0;
        for batch in projected.chunks(batch_size) {
            let data = &mut self.accumulators[layer];
            data.zero();
            for input in batch {
                self.layers[layer].clamp(input.view())?;
                propagate_up(&mut self.layers, &self.recognition, layer + 1, &mut *self.random)?;
                data.add_positive(
                    self.layers[layer].activities(),
                    self.layers[layer + 1].activities(),
                )?;
                propagate_down(&mut self.layers, &self.recognition, layer, &mut *self.random)?;
                propagate_up(&mut self.layers, &self.recognition, layer + 1, &mut *self.random)?;
                data.add_negative(
                    self.layers[layer].activities(),
                    self.layers[layer + 1].activities(),
                )?;
            }
            data.scale(1.0 / batch.len() as f64);

            let (lower, upper) = self.layers.split_at_mut(layer + 1);
            contrastive::train(
                &mut lower[layer],
                &mut upper[0],
                data,
                &rate,
                self.recognition.get_mut(layer)?,
            )?;
            let error = data.visible_error()?;
            debug!(
                "pre-training layer {} batch {} ({} samples): mse={}",
                layer,
                batches,
                batch.len(),
                error
            );
            self.report(error);
            total_error += error;
            batches += 1;
        }
        Ok(total_error / batches as f64)
    }

    /// Ends pre-training, copying the recognition weights into the
    /// generative stack.
    pub fn pre_training_complete(&mut self) -> Result<()> {
        if !self.pretraining {
            return Err(Error::UsageSequence(
                "pre_training_complete has already been called",
            ));
        }
        self.generative = self.recognition.clone();
        self.pretraining = false;
        info!(
            "pre-training complete for {} layers, switching to fine-tuning",
            self.layers.len()
        );
        Ok(())
    }

    /// Fine-tunes the whole stack on a single sample.
    pub fn fine_tune_one(&mut self, sample: &[f64]) -> Result<f64> {
        self.fine_tune(&[sample], 1)
    }

    /// Fine-tunes the whole stack with the wake-sleep algorithm.
    ///
    /// Every sample is compressed through the recognition weights, which
    /// nudges the generative weights toward reproducing the bottom-up states
    /// (wake). It is then reconstructed through the generative weights, which
    /// nudges the recognition weights toward the top-down states (sleep).
    /// One error report is made per sample.
    ///
    /// Returns the mean of the reported errors.
    pub fn fine_tune<S>(&mut self, samples: &[S], batch_size: usize) -> Result<f64>
    where
        S: AsRef<[f64]>,
    {
        if self.pretraining {
            return Err(Error::UsageSequence(
                "pre_training_complete hasn't been called, the model can't be fine-tuned yet",
            ));
        }
        if samples.is_empty() {
            return Err(Error::NullInput("no samples to fine-tune on"));
        }
        error::within_bounds("fine-tuning batch size", batch_size, 1, samples.len() + 1)?;
        self.check_inputs(samples)?;

        let mut total_error = 0.0;
        for (b, batch) in samples.chunks(batch_size).enumerate() {
            let mut batch_error = 0.0;
            for sample in batch {
                let sample = ArrayView1::from(sample.as_ref());
                self.compress_view(sample)?;
                self.wake_phase()?;
                self.reconstruct_current()?;
                self.sleep_phase()?;
                let error = utils::mean_square_error(sample, self.layers[0].activities())?;
                trace!("fine-tuning sample error: mse={}", error);
                self.report(error);
                batch_error += error;
            }
            debug!(
                "fine-tuning batch {} ({} samples): mse={}",
                b,
                batch.len(),
                batch_error / batch.len() as f64
            );
            total_error += batch_error;
        }
        Ok(total_error / samples.len() as f64)
    }

    /// Adjusts the generative weights using the bottom-up states:
    /// `delta(j, k) = rate * hidden_state[k] * (visible_state[j] - visible_activity[j])`.
    fn wake_phase(&mut self) -> Result<()> {
        for i in 0..self.layers.len() - 1 {
            let rate = self.rates.fine_weight_rates[i];
            let visible = &self.layers[i];
            let hidden = &self.layers[i + 1];
            let prediction_error = &visible.states() - &visible.activities();
            self.generative
                .get_mut(i)?
                .apply_outer(rate, prediction_error.view(), hidden.states());
        }
        Ok(())
    }

    /// Adjusts the recognition weights using the top-down states:
    /// `delta(j, k) = rate * visible_state[j] * (hidden_state[k] - hidden_activity[k])`.
    fn sleep_phase(&mut self) -> Result<()> {
        for i in 0..self.layers.len() - 1 {
            let rate = self.rates.fine_weight_rates[i];
            let visible = &self.layers[i];
            let hidden = &self.layers[i + 1];
            let prediction_error = &hidden.states() - &hidden.activities();
            self.recognition
                .get_mut(i)?
                .apply_outer(rate, visible.states(), prediction_error.view());
        }
        Ok(())
    }

    /// Encodes `data`, returning the activity of the top layer.
    pub fn compress(&mut self, data: &[f64]) -> Result<Vec<f64>> {
        self.compress_view(ArrayView1::from(data))?;
        Ok(self.layers[self.layers.len() - 1].activities().to_vec())
    }

    /// Decodes `code`, returning the activity of the input layer.
    pub fn reconstruct(&mut self, code: &[f64]) -> Result<Vec<f64>> {
        self.reconstruct_view(ArrayView1::from(code))?;
        Ok(self.layers[0].activities().to_vec())
    }

    /// Decodes the current state of the top layer.
    pub fn reconstruct_current(&mut self) -> Result<Vec<f64>> {
        let top = self.layers[self.layers.len() - 1].states().to_owned();
        self.reconstruct_view(top.view())?;
        Ok(self.layers[0].activities().to_vec())
    }

    fn compress_view(&mut self, data: ArrayView1<f64>) -> Result<()> {
        let top = self.layers.len() - 1;
        self.calculate_to_layer(data, top).map(|_| ())
    }

    fn reconstruct_view(&mut self, code: ArrayView1<f64>) -> Result<()> {
        let top = self.layers.len() - 1;
        self.layers[top].clamp(code)?;
        for k in (0..top).rev() {
            propagate_down(&mut self.layers, &self.generative, k, &mut *self.random)?;
        }
        Ok(())
    }

    /// Clamps layer 0 to `data` and propagates it up to layer `to` through the
    /// recognition weights, returning that layer's activity.
    fn calculate_to_layer(&mut self, data: ArrayView1<f64>, to: usize) -> Result<Array1<f64>> {
        self.layers[0].clamp(data)?;
        for k in 1..=to {
            propagate_up(&mut self.layers, &self.recognition, k, &mut *self.random)?;
        }
        Ok(self.layers[to].activities().to_owned())
    }

    /// Rejects a sample set before any state is touched.
    fn check_inputs<S: AsRef<[f64]>>(&self, samples: &[S]) -> Result<()> {
        let expected = self.input_len();
        for sample in samples {
            error::same_len("input sample", sample.as_ref().len(), expected)?;
        }
        Ok(())
    }

    fn report(&mut self, error: f64) {
        for observer in &mut self.observers {
            observer.on_error_calculated(error);
        }
    }
}

/// Sets layer `k` from layer `k - 1` through `weights[k - 1]`.
fn propagate_up(
    layers: &mut [Layer],
    weights: &WeightStack,
    k: usize,
    random: &mut dyn RandomSource,
) -> Result<()> {
    let net_input = weights.get(k - 1)?.forward(layers[k - 1].states());
    layers[k].activate(&net_input, random)
}

/// Sets layer `k` from layer `k + 1` through `weights[k]`, traversed in the
/// decoding direction.
fn propagate_down(
    layers: &mut [Layer],
    weights: &WeightStack,
    k: usize,
    random: &mut dyn RandomSource,
) -> Result<()> {
    let net_input = weights.get(k)?.backward(layers[k + 1].states());
    layers[k].activate(&net_input, random)
}

impl fmt::Debug for Autoencoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Autoencoder")
            .field("layers", &self.layers)
            .field("rates", &self.rates)
            .field("recognition", &self.recognition)
            .field("generative", &self.generative)
            .field("pretraining", &self.pretraining)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::AutoencoderBuilder;
    use crate::initializer::{ConstantInitializer, ZeroInitializer};
    use crate::random;

    use approx::assert_abs_diff_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn gaussian_4_2() -> Autoencoder {
        AutoencoderBuilder::new()
            .gaussian_layer(4)
            .gaussian_layer(2)
            .initializer(ZeroInitializer)
            .random_source(random::seeded(0))
            .build()
            .unwrap()
    }

    fn recorder(model: &mut Autoencoder) -> Rc<RefCell<Vec<f64>>> {
        let errors = Rc::new(RefCell::new(Vec::new()));
        let sink = errors.clone();
        model.add_error_observer(move |e: f64| sink.borrow_mut().push(e));
        errors
    }

    #[test]
    fn zero_weights_compress_to_zero() {
        let mut model = gaussian_4_2();
        assert_eq!(model.compress(&[1.0, 2.0, 3.0, 4.0]).unwrap(), vec![0.0, 0.0]);
        assert_eq!(model.reconstruct(&[0.0, 0.0]).unwrap(), vec![0.0; 4]);
    }

    #[test]
    fn compress_rejects_wrong_size() {
        let mut model = gaussian_4_2();
        assert!(model.compress(&[1.0, 2.0]).is_err());
        assert!(model.reconstruct(&[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn gaussian_compress_is_linear() {
        let mut model = AutoencoderBuilder::new()
            .gaussian_layer(2)
            .gaussian_layer(1)
            .initializer(ConstantInitializer {
                weight: 0.5,
                bias: 0.25,
            })
            .build()
            .unwrap();
        let code = model.compress(&[1.0, 3.0]).unwrap();
        assert_abs_diff_eq!(code[0], 0.5 * 4.0 + 0.25);
        let again = model.compress(&[1.0, 3.0]).unwrap();
        assert_eq!(code, again);
        let input = model.reconstruct(&[2.0]).unwrap();
        assert_abs_diff_eq!(input[0], 1.25);
        assert_abs_diff_eq!(input[1], 1.25);
    }

    #[test]
    fn usage_sequence() {
        let mut model = gaussian_4_2();
        let data = [[1.0, 0.0, 0.0, 1.0]];
        match model.fine_tune(&data, 1) {
            Err(Error::UsageSequence(_)) => {}
            other => panic!("expected usage error, got {:?}", other),
        }
        model.pre_training_complete().unwrap();
        for _ in 0..2 {
            match model.pre_training_complete() {
                Err(Error::UsageSequence(_)) => {}
                other => panic!("expected usage error, got {:?}", other),
            }
        }
        match model.pretrain(0, &data, 1) {
            Err(Error::UsageSequence(_)) => {}
            other => panic!("expected usage error, got {:?}", other),
        }
        assert!(model.fine_tune(&data, 1).is_ok());
    }

    #[test]
    fn pretraining_bounds() {
        let mut model = gaussian_4_2();
        let data = [[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 1.0, 0.0]];
        match model.pretrain(1, &data, 1) {
            Err(Error::Bounds { .. }) => {}
            other => panic!("expected bounds error, got {:?}", other),
        }
        for &size in [0, 3].iter() {
            match model.pretrain(0, &data, size) {
                Err(Error::Bounds { .. }) => {}
                other => panic!("expected bounds error, got {:?}", other),
            }
        }
        let empty: [[f64; 4]; 0] = [];
        match model.pretrain(0, &empty, 1) {
            Err(Error::NullInput(_)) => {}
            other => panic!("expected null input error, got {:?}", other),
        }
    }

    #[test]
    fn fine_tuning_bounds() {
        let mut model = gaussian_4_2();
        model.pre_training_complete().unwrap();
        let data = [[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 1.0, 0.0]];
        for &size in [0, 3].iter() {
            match model.fine_tune(&data, size) {
                Err(Error::Bounds { .. }) => {}
                other => panic!("expected bounds error, got {:?}", other),
            }
        }
    }

    #[test]
    fn malformed_sample_is_rejected_before_training() {
        let mut model = gaussian_4_2();
        let errors = recorder(&mut model);
        let data: Vec<Vec<f64>> = vec![vec![1.0, 0.0, 0.0, 1.0], vec![1.0, 2.0]];
        match model.pretrain(0, &data, 1) {
            Err(Error::ShapeMismatch { .. }) => {}
            other => panic!("expected shape error, got {:?}", other),
        }
        assert!(errors.borrow().is_empty());
        assert_eq!(model.recognition_weights().get(0).unwrap().weight(0, 0).unwrap(), 0.0);
    }

    #[test]
    fn ragged_batches_keep_the_remainder() {
        let mut model = gaussian_4_2();
        let errors = recorder(&mut model);
        let data = vec![[1.0, 2.0, 3.0, 4.0]; 5];
        model.pretrain(0, &data, 2).unwrap();
        assert_eq!(errors.borrow().len(), 3);
    }

    #[test]
    fn one_report_per_fine_tuning_sample() {
        let mut model = gaussian_4_2();
        model.pre_training_complete().unwrap();
        let errors = recorder(&mut model);
        let data = vec![[1.0, 2.0, 3.0, 4.0]; 5];
        let mean = model.fine_tune(&data, 2).unwrap();
        let errors = errors.borrow();
        assert_eq!(errors.len(), 5);
        // Zero weights reconstruct zeros: mse = (1 + 4 + 9 + 16) / 4.
        assert_abs_diff_eq!(errors[0], 7.5);
        assert_abs_diff_eq!(mean, 7.5);
    }

    #[test]
    fn constant_phases_only_decay() {
        // With zero weights and biases the Gaussian pair reconstructs zeros
        // from zeros, so both phases agree and only decay/momentum act.
        let mut model = AutoencoderBuilder::new()
            .gaussian_layer(2)
            .gaussian_layer(2)
            .initializer(ZeroInitializer)
            .build()
            .unwrap();
        let data = [[0.0, 0.0]];
        for _ in 0..10 {
            let error = model.pretrain(0, &data, 1).unwrap();
            assert_eq!(error, 0.0);
        }
        let set = model.recognition_weights().get(0).unwrap();
        assert!(set.weights().iter().all(|&w| w == 0.0));
        assert!(set.changes().iter().all(|&c| c == 0.0));
    }

    #[test]
    fn pretraining_moves_recognition_weights_only() {
        let mut model = AutoencoderBuilder::new()
            .gaussian_layer(3)
            .binary_layer(2)
            .pretraining_weight_rate(0, 0.1)
            .random_source(random::seeded(42))
            .initializer(ConstantInitializer {
                weight: 0.1,
                bias: 0.0,
            })
            .build()
            .unwrap();
        let data = vec![[1.0, 0.0, 1.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]];
        model.pretrain(0, &data, 3).unwrap();
        let recognition = model.recognition_weights().clone();
        let generative = model.generative_weights().clone();
        assert_ne!(recognition, generative);
        model.pre_training_complete().unwrap();
        assert_eq!(model.generative_weights(), &recognition);
    }

    #[test]
    fn generative_snapshot_is_independent() {
        let mut model = AutoencoderBuilder::new()
            .binary_layer(4)
            .binary_layer(3)
            .binary_layer(2)
            .finetuning_weight_rate(0, 0.5)
            .finetuning_weight_rate(1, 0.5)
            .random_source(random::seeded(7))
            .build()
            .unwrap();
        model.pre_training_complete().unwrap();
        let before = model.recognition_weights().clone();
        let data = vec![[1.0, 0.0, 1.0, 0.0], [0.0, 1.0, 0.0, 1.0]];
        for _ in 0..5 {
            model.fine_tune(&data, 1).unwrap();
        }
        assert_ne!(model.generative_weights(), model.recognition_weights());
        assert_ne!(model.recognition_weights(), &before);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let run = || {
            let mut model = AutoencoderBuilder::new()
                .binary_layer(4)
                .binary_layer(2)
                .initializer(ConstantInitializer {
                    weight: 0.3,
                    bias: -0.1,
                })
                .random_source(random::seeded(99))
                .build()
                .unwrap();
            let code = model.compress(&[1.0, 0.0, 1.0, 1.0]).unwrap();
            let input = model.reconstruct_current().unwrap();
            (code, input)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn accessors() {
        let model = gaussian_4_2();
        assert_eq!(model.num_layers(), 2);
        assert_eq!(model.input_len(), 4);
        assert_eq!(model.code_len(), 2);
        assert!(model.layer(2).is_err());
        assert_eq!(model.recognition_weights().len(), 1);
        assert!(model.is_pretraining());
    }
}
