//! Dense connection weights between adjacent layers.

use crate::error::{Error, Result};
use crate::initializer::WeightInitializer;
use crate::layer::Layer;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// The weights connecting a pre-synaptic layer to a post-synaptic layer.
///
/// `weight[[pre, post]]` is stored alongside the last delta applied to it,
/// which the contrastive-divergence rule feeds back as its momentum term.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightSet {
    weights: Array2<f64>,
    changes: Array2<f64>,
}

impl WeightSet {
    /// Creates a `pre x post` weight set drawing every weight from
    /// `initializer`.
    pub fn new(pre: usize, post: usize, initializer: &mut dyn WeightInitializer) -> Result<Self> {
        if pre == 0 || post == 0 {
            return Err(Error::InvalidArgument(
                "weight sets need at least one pre- and post-synaptic neuron",
            ));
        }
        let mut weights = Array2::zeros((pre, post));
        for w in weights.iter_mut() {
            *w = initializer.initialize_weight();
        }
        Ok(WeightSet {
            weights,
            changes: Array2::zeros((pre, post)),
        })
    }

    /// Rebuilds a weight set from its rows. The post-synaptic size is the
    /// width of the rows, so there must be at least one and they must agree.
    pub(crate) fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let pre = rows.len();
        let post = match rows.first() {
            Some(row) => row.len(),
            None => return Err(Error::Format("weight set has no pre-synaptic rows".into())),
        };
        if post == 0 {
            return Err(Error::Format("weight set has empty rows".into()));
        }
        if let Some(i) = rows.iter().position(|row| row.len() != post) {
            return Err(Error::Format(format!(
                "weight set row {} has {} columns, expected {}",
                i,
                rows[i].len(),
                post
            )));
        }
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let weights = Array2::from_shape_vec((pre, post), flat)
            .map_err(|e| Error::Format(format!("weight set shape: {}", e)))?;
        Ok(WeightSet {
            weights,
            changes: Array2::zeros((pre, post)),
        })
    }

    /// Returns the number of pre-synaptic neurons.
    pub fn pre_len(&self) -> usize {
        self.weights.nrows()
    }

    /// Returns the number of post-synaptic neurons.
    pub fn post_len(&self) -> usize {
        self.weights.ncols()
    }

    pub fn weight(&self, pre: usize, post: usize) -> Result<f64> {
        self.check(pre, post)?;
        Ok(self.weights[[pre, post]])
    }

    pub fn weight_change(&self, pre: usize, post: usize) -> Result<f64> {
        self.check(pre, post)?;
        Ok(self.changes[[pre, post]])
    }

    /// Adds `delta` to a weight and records it as the weight's last change.
    pub fn modify_weight(&mut self, pre: usize, post: usize, delta: f64) -> Result<()> {
        self.check(pre, post)?;
        self.apply(pre, post, delta);
        Ok(())
    }

    /// Overwrites a weight, recording the implied delta as its last change.
    pub fn set_weight(&mut self, pre: usize, post: usize, value: f64) -> Result<()> {
        self.check(pre, post)?;
        self.changes[[pre, post]] = value - self.weights[[pre, post]];
        self.weights[[pre, post]] = value;
        Ok(())
    }

    pub fn weights(&self) -> ArrayView2<f64> {
        self.weights.view()
    }

    pub fn changes(&self) -> ArrayView2<f64> {
        self.changes.view()
    }

    /// Net input to the post-synaptic layer: `sum_j weight[j][k] * pre[j]`.
    pub(crate) fn forward(&self, pre_states: ArrayView1<f64>) -> Array1<f64> {
        self.weights.t().dot(&pre_states)
    }

    /// Net input to the pre-synaptic layer: `sum_j weight[k][j] * post[j]`.
    pub(crate) fn backward(&self, post_states: ArrayView1<f64>) -> Array1<f64> {
        self.weights.dot(&post_states)
    }

    /// Unchecked `modify_weight` for the training loops, which only iterate
    /// over valid indices.
    pub(crate) fn apply(&mut self, pre: usize, post: usize, delta: f64) {
        self.changes[[pre, post]] = delta;
        self.weights[[pre, post]] += delta;
    }

    /// Applies `delta(j, k) = rate * pre[j] * post[k]` to every synapse.
    pub(crate) fn apply_outer(&mut self, rate: f64, pre: ArrayView1<f64>, post: ArrayView1<f64>) {
        for ((j, k), change) in self.changes.indexed_iter_mut() {
            *change = rate * pre[j] * post[k];
        }
        self.weights += &self.changes;
    }

    fn check(&self, pre: usize, post: usize) -> Result<()> {
        if pre >= self.pre_len() {
            return Err(Error::bounds("pre-synaptic index", pre, self.pre_len()));
        }
        if post >= self.post_len() {
            return Err(Error::bounds("post-synaptic index", post, self.post_len()));
        }
        Ok(())
    }
}

/// Persisted as its rows. Changes are transient and never written.
impl Serialize for WeightSet {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.weights.outer_iter().map(|row| row.to_vec()))
    }
}

impl<'de> Deserialize<'de> for WeightSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = Vec::<Vec<f64>>::deserialize(deserializer)?;
        WeightSet::from_rows(rows).map_err(de::Error::custom)
    }
}

/// One weight set per adjacent layer pair, indexed by the pre-synaptic
/// layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightStack {
    sets: Vec<WeightSet>,
}

impl WeightStack {
    /// Creates a weight set for every adjacent pair in `layers`.
    pub fn new(layers: &[Layer], initializer: &mut dyn WeightInitializer) -> Result<Self> {
        let sets = layers
            .windows(2)
            .map(|pair| WeightSet::new(pair[0].len(), pair[1].len(), &mut *initializer))
            .collect::<Result<Vec<_>>>()?;
        Ok(WeightStack { sets })
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Returns the weights leaving layer `pre`.
    pub fn get(&self, pre: usize) -> Result<&WeightSet> {
        let len = self.len();
        self.sets
            .get(pre)
            .ok_or_else(|| Error::bounds("weight set index", pre, len))
    }

    pub fn get_mut(&mut self, pre: usize) -> Result<&mut WeightSet> {
        let len = self.len();
        self.sets
            .get_mut(pre)
            .ok_or_else(|| Error::bounds("weight set index", pre, len))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WeightSet> {
        self.sets.iter()
    }
}
