//! Utilities for training autoencoders.
//!
//! # Example
//!
//! ```
//! # use autoencoder::{AutoencoderBuilder, Trainer, random};
//! # use autoencoder::trainer::{LearningMode, Logging, StopCondition};
//! let samples = vec![
//!     [1.0, 1.0, 0.0, 0.0],
//!     [0.0, 0.0, 1.0, 1.0],
//!     [1.0, 0.0, 1.0, 0.0],
//! ];
//! let model = AutoencoderBuilder::new()
//!     .binary_layer(4)
//!     .binary_layer(2)
//!     .random_source(random::seeded(1))
//!     .build()
//!     .unwrap();
//!
//! let mut model = Trainer::new(model)
//!     .learning_mode(LearningMode::Batch(3))
//!     .pretraining_stop(StopCondition::Iterations(5))
//!     .finetuning_stop(StopCondition::Iterations(5))
//!     .logging(Logging::Silent)
//!     .train(&samples)
//!     .unwrap();
//!
//! assert!(!model.is_pretraining());
//! assert_eq!(model.compress(&samples[0]).unwrap().len(), 2);
//! ```

use crate::autoencoder::Autoencoder;
use crate::error::Result;

use log::info;
use std::time::{Duration, Instant};

/// Runs the pre-training and fine-tuning phases over a sample set.
#[derive(Debug)]
pub struct Trainer {
    model: Autoencoder,
    learning_mode: LearningMode,
    logging: Logging,
    pretraining_stop: StopCondition,
    finetuning_stop: StopCondition,
}

impl Trainer {
    /// Creates a new Trainer instance.
    ///
    /// The trainer is initialized with some default values. These defaults are:
    ///
    /// * A stochastic learning mode.
    /// * Pre-trains every layer pair for 10 epochs.
    /// * Fine-tunes for 10 epochs.
    /// * Logs on training completion.
    pub fn new(model: Autoencoder) -> Self {
        Trainer {
            model,
            learning_mode: LearningMode::Stochastic,
            logging: Logging::Completion,
            pretraining_stop: StopCondition::Iterations(10),
            finetuning_stop: StopCondition::Iterations(10),
        }
    }

    /// Sets the `LearningMode` to use for training.
    pub fn learning_mode(mut self, mode: LearningMode) -> Self {
        self.learning_mode = mode;
        self
    }

    /// Sets the type of logging to be emitted during training.
    pub fn logging(mut self, logging: Logging) -> Self {
        self.logging = logging;
        self
    }

    /// Sets the condition to finish pre-training each layer pair.
    pub fn pretraining_stop<C>(mut self, condition: C) -> Self
    where
        C: Into<StopCondition>,
    {
        self.pretraining_stop = condition.into();
        self
    }

    /// Sets the condition to finish fine-tuning.
    pub fn finetuning_stop<C>(mut self, condition: C) -> Self
    where
        C: Into<StopCondition>,
    {
        self.finetuning_stop = condition.into();
        self
    }

    /// Trains the autoencoder on the provided `samples`.
    ///
    /// Every layer pair is pre-trained bottom-up until the pre-training stop
    /// condition holds, then the model is fine-tuned until the fine-tuning
    /// stop condition holds. Models that have already completed pre-training
    /// go straight to fine-tuning.
    ///
    /// Returns:
    ///   The trained autoencoder, or an error if invalid training parameters
    ///   were provided.
    pub fn train<S>(mut self, samples: &[S]) -> Result<Autoencoder>
    where
        S: AsRef<[f64]>,
    {
        let batch_size = match self.learning_mode {
            LearningMode::Stochastic => 1,
            LearningMode::Batch(size) => size,
        };

        if self.model.is_pretraining() {
            for layer in 0..self.model.num_layers() - 1 {
                let start_time = Instant::now();
                let mut iteration = 0;
                let mut training_error;
                loop {
                    training_error = self.model.pretrain(layer, samples, batch_size)?;
                    iteration += 1;

                    self.logging.iteration("pre-training", iteration, training_error);
                    if self
                        .pretraining_stop
                        .should_stop(iteration, training_error, start_time)
                    {
                        break;
                    }
                }
                self.logging
                    .completion("pre-training", iteration, training_error, start_time);
            }
            self.model.pre_training_complete()?;
        }

        let start_time = Instant::now();
        let mut iteration = 0;
        let mut training_error;
        loop {
            training_error = self.model.fine_tune(samples, batch_size)?;
            iteration += 1;

            self.logging.iteration("fine-tuning", iteration, training_error);
            if self
                .finetuning_stop
                .should_stop(iteration, training_error, start_time)
            {
                break;
            }
        }
        self.logging
            .completion("fine-tuning", iteration, training_error, start_time);
        Ok(self.model)
    }
}

/// The learning mode to use for training
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LearningMode {
    /// Apply weight updates after every training example
    Stochastic,
    /// Pre-train on batches of the provided size
    ///
    /// Must be between 1 and the total number of training instances.
    Batch(usize),
}

/// Logging frequency to use during training
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Logging {
    /// No logs will be emitted
    Silent,
    /// A summary will be logged at the end of each phase
    Completion,
    /// A summary will be logged after every `n` epochs
    Iterations(usize),
}

impl Logging {
    /// Performs logging at the current `iteration` of a phase.
    fn iteration(&self, phase: &str, iteration: usize, training_error: f64) {
        if let Logging::Iterations(freq) = *self {
            if freq > 0 && iteration % freq == 0 {
                info!("{} iteration {}: MSE={}", phase, iteration, training_error);
            }
        }
    }

    /// Performs logging at the end of a phase.
    fn completion(&self, phase: &str, iterations: usize, training_error: f64, start_time: Instant) {
        if let Logging::Silent = *self {
            return;
        }
        info!(
            "{} ran {} iterations in {:.3} seconds, final MSE={}",
            phase,
            iterations,
            start_time.elapsed().as_secs_f64(),
            training_error
        );
    }
}

/// When to stop training
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StopCondition {
    /// Stops after the provided number of training iterations
    Iterations(usize),
    /// Stops when the training error drops below the provided threshold
    ErrorThreshold(f64),
    /// Stops after the provided duration
    Duration(Duration),
}

impl From<Duration> for StopCondition {
    fn from(duration: Duration) -> StopCondition {
        StopCondition::Duration(duration)
    }
}

impl StopCondition {
    /// Returns true if the phase is complete.
    fn should_stop(&self, iteration: usize, training_error: f64, start_time: Instant) -> bool {
        match *self {
            StopCondition::Iterations(iterations) => iteration >= iterations,
            StopCondition::ErrorThreshold(threshold) => training_error < threshold,
            StopCondition::Duration(duration) => start_time.elapsed() > duration,
        }
    }
}
