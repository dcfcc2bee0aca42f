//! Saving and loading trained models in the line format.
//!
//! A model is written as its learning-rate schedule, its recognition and
//! generative weight stacks, its layers (tag, neuron count and biases) and
//! finally its training phase. States, activities and momentum terms are not
//! written; they restart at zero after a load.

use crate::activator::Activator;
use crate::autoencoder::Autoencoder;
use crate::error::{Error, Result};
use crate::format;
use crate::layer::Layer;
use crate::learning_rate::LearningRates;
use crate::random;
use crate::weights::WeightStack;

use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    rates: &'a LearningRates,
    recognition: &'a WeightStack,
    generative: &'a WeightStack,
    layers: Vec<LayerRecord>,
    pretraining: bool,
}

#[derive(Deserialize)]
struct Snapshot {
    rates: LearningRates,
    recognition: WeightStack,
    generative: WeightStack,
    layers: Vec<LayerRecord>,
    pretraining: bool,
}

#[derive(Serialize, Deserialize)]
struct LayerRecord {
    kind: Activator,
    neurons: usize,
    bias: Vec<f64>,
}

impl Snapshot {
    fn into_autoencoder(self) -> Result<Autoencoder> {
        if self.layers.len() < 2 {
            return Err(Error::Format(format!(
                "a model needs at least two layers, found {}",
                self.layers.len()
            )));
        }
        let layers = self
            .layers
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                if record.bias.len() != record.neurons {
                    return Err(Error::Format(format!(
                        "layer {} has {} neurons but {} biases",
                        i,
                        record.neurons,
                        record.bias.len()
                    )));
                }
                Layer::with_bias(record.kind, record.bias)
                    .map_err(|e| Error::Format(format!("layer {}: {}", i, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        self.rates
            .validate(layers.len())
            .map_err(|e| Error::Format(format!("learning rates: {}", e)))?;
        check_stack("recognition", &self.recognition, &layers)?;
        check_stack("generative", &self.generative, &layers)?;

        Ok(Autoencoder::from_parts(
            layers,
            self.rates,
            self.recognition,
            self.generative,
            self.pretraining,
            random::default_source(),
        ))
    }
}

fn check_stack(which: &str, stack: &WeightStack, layers: &[Layer]) -> Result<()> {
    if stack.len() != layers.len() - 1 {
        return Err(Error::Format(format!(
            "{} stack has {} weight sets, expected {}",
            which,
            stack.len(),
            layers.len() - 1
        )));
    }
    for (i, (set, pair)) in stack.iter().zip(layers.windows(2)).enumerate() {
        if set.pre_len() != pair[0].len() || set.post_len() != pair[1].len() {
            return Err(Error::Format(format!(
                "{} weight set {} is {}x{}, expected {}x{}",
                which,
                i,
                set.pre_len(),
                set.post_len(),
                pair[0].len(),
                pair[1].len()
            )));
        }
    }
    Ok(())
}

impl Autoencoder {
    /// Writes the model to `writer`.
    pub fn save<W: Write>(&self, writer: W) -> Result<()> {
        let layers = self
            .layers()
            .iter()
            .map(|layer| LayerRecord {
                kind: layer.activator(),
                neurons: layer.len(),
                bias: layer.biases().to_vec(),
            })
            .collect();
        let snapshot = SnapshotRef {
            rates: self.learning_rates(),
            recognition: self.recognition_weights(),
            generative: self.generative_weights(),
            layers,
            pretraining: self.is_pretraining(),
        };
        format::to_writer(writer, &snapshot)
    }

    /// Reads a model written by `save`.
    ///
    /// The loaded model samples binary neurons with an entropy-seeded
    /// generator; use `set_random_source` for reproducible runs.
    pub fn load<R: BufRead>(reader: R) -> Result<Self> {
        let snapshot: Snapshot = format::from_reader(reader)?;
        snapshot.into_autoencoder()
    }

    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        debug!("saving autoencoder to {}", path.display());
        self.save(BufWriter::new(File::create(path)?))
    }

    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("loading autoencoder from {}", path.display());
        Self::load(BufReader::new(File::open(path)?))
    }
}
