//! Stacked [restricted Boltzmann machine](https://en.wikipedia.org/wiki/Restricted_Boltzmann_machine)
//! autoencoders.
//!
//! # Example
//!
//! Let's compress two-hot patterns of four inputs into a two-neuron code:
//!
//! ```
//! # use autoencoder::{AutoencoderBuilder, random};
//! let samples = [
//!     [1.0, 1.0, 0.0, 0.0],
//!     [0.0, 0.0, 1.0, 1.0],
//!     [1.0, 0.0, 0.0, 1.0],
//! ];
//!
//! let mut model = AutoencoderBuilder::new()
//!     .binary_layer(4)
//!     .binary_layer(3)
//!     .binary_layer(2)
//!     .random_source(random::seeded(42))
//!     .build()
//!     .unwrap();
//!
//! // Pre-train each layer pair bottom-up, then fine-tune the whole stack.
//! for layer in 0..model.num_layers() - 1 {
//!     for _ in 0..10 {
//!         model.pretrain(layer, &samples, 3).unwrap();
//!     }
//! }
//! model.pre_training_complete().unwrap();
//! for _ in 0..10 {
//!     model.fine_tune(&samples, 1).unwrap();
//! }
//!
//! let code = model.compress(&samples[0]).unwrap();
//! assert_eq!(code.len(), 2);
//! let reconstruction = model.reconstruct(&code).unwrap();
//! assert_eq!(reconstruction.len(), 4);
//! ```

#[macro_use]
extern crate serde_derive;

pub mod activator;
pub mod format;
pub mod initializer;
pub mod random;
pub mod trainer;

mod autoencoder;
mod builder;
mod contrastive;
mod error;
mod layer;
mod learning_rate;
mod observer;
mod persist;
mod rbm;
mod utils;
mod weights;

pub use crate::autoencoder::Autoencoder;
pub use crate::builder::AutoencoderBuilder;
pub use crate::contrastive::{Accumulator, WEIGHT_DECAY};
pub use crate::error::{Error, Result};
pub use crate::layer::Layer;
pub use crate::learning_rate::{LearningRates, RbmLearningRate};
pub use crate::observer::ErrorObserver;
pub use crate::rbm::Rbm;
pub use crate::trainer::Trainer;
pub use crate::weights::{WeightSet, WeightStack};
