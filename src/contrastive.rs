//! One-step contrastive divergence.
//!
//! The positive phase clamps a layer to data and records the activities of
//! both layers of the pair. The negative phase reconstructs the visible layer
//! from the hidden one and records the activities again. The difference of
//! the two correlations drives the weight and bias updates.

use crate::error::Result;
use crate::layer::Layer;
use crate::learning_rate::RbmLearningRate;
use crate::utils::{self, ZeroOut};
use crate::weights::WeightSet;

use ndarray::{Array1, ArrayView1};

/// L2 weight decay subtracted from every weight update.
pub const WEIGHT_DECAY: f64 = 0.0002;

/// Phase statistics of one layer pair, accumulated over a mini-batch.
#[derive(Clone, Debug, PartialEq)]
pub struct Accumulator {
    pub pos_visible: Array1<f64>,
    pub pos_hidden: Array1<f64>,
    pub neg_visible: Array1<f64>,
    pub neg_hidden: Array1<f64>,
}

impl Accumulator {
    pub fn new(visible: usize, hidden: usize) -> Self {
        Accumulator {
            pos_visible: Array1::zeros(visible),
            pos_hidden: Array1::zeros(hidden),
            neg_visible: Array1::zeros(visible),
            neg_hidden: Array1::zeros(hidden),
        }
    }

    pub fn zero(&mut self) {
        self.pos_visible.zero_out();
        self.pos_hidden.zero_out();
        self.neg_visible.zero_out();
        self.neg_hidden.zero_out();
    }

    pub fn scale(&mut self, factor: f64) {
        self.pos_visible *= factor;
        self.pos_hidden *= factor;
        self.neg_visible *= factor;
        self.neg_hidden *= factor;
    }

    pub fn add_positive(&mut self, visible: ArrayView1<f64>, hidden: ArrayView1<f64>) -> Result<()> {
        utils::add_assign("positive visible phase", &mut self.pos_visible, visible)?;
        utils::add_assign("positive hidden phase", &mut self.pos_hidden, hidden)
    }

    pub fn add_negative(&mut self, visible: ArrayView1<f64>, hidden: ArrayView1<f64>) -> Result<()> {
        utils::add_assign("negative visible phase", &mut self.neg_visible, visible)?;
        utils::add_assign("negative hidden phase", &mut self.neg_hidden, hidden)
    }

    /// Mean squared difference between the positive and negative visible
    /// phases.
    pub fn visible_error(&self) -> Result<f64> {
        utils::mean_square_error(self.pos_visible.view(), self.neg_visible.view())
    }
}

/// Applies one contrastive-divergence update to `weights` and to the biases
/// of both layers of the pair.
///
/// For every synapse `(i, j)`:
///
/// ```text
/// delta = weight_momentum * change(i, j)
///       + weight_rate * (pos_vis[i] * pos_hid[j] - neg_vis[i] * neg_hid[j])
///       - WEIGHT_DECAY * weight(i, j)
/// ```
pub fn train(
    visible: &mut Layer,
    hidden: &mut Layer,
    data: &Accumulator,
    rate: &RbmLearningRate,
    weights: &mut WeightSet,
) -> Result<()> {
    crate::error::same_len("visible layer", visible.len(), weights.pre_len())?;
    crate::error::same_len("hidden layer", hidden.len(), weights.post_len())?;
    crate::error::same_len("visible phase", data.pos_visible.len(), weights.pre_len())?;
    crate::error::same_len("hidden phase", data.pos_hidden.len(), weights.post_len())?;

    for i in 0..weights.pre_len() {
        for j in 0..weights.post_len() {
            let gradient = data.pos_visible[i] * data.pos_hidden[j]
                - data.neg_visible[i] * data.neg_hidden[j];
            let delta = rate.weight_momentum * weights.changes()[[i, j]]
                + rate.weight_rate * gradient
                - WEIGHT_DECAY * weights.weights()[[i, j]];
            weights.apply(i, j, delta);
        }
    }
    visible.train_biases(
        rate.bias_rate,
        rate.bias_momentum,
        data.pos_visible.view(),
        data.neg_visible.view(),
    )?;
    hidden.train_biases(
        rate.bias_rate,
        rate.bias_momentum,
        data.pos_hidden.view(),
        data.neg_hidden.view(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initializer::{ConstantInitializer, ZeroInitializer};

    use approx::assert_abs_diff_eq;
    use ndarray::arr1;

    fn rate() -> RbmLearningRate {
        RbmLearningRate {
            weight_rate: 0.1,
            bias_rate: 0.2,
            weight_momentum: 0.5,
            bias_momentum: 0.5,
        }
    }

    #[test]
    fn gradient_step() {
        let mut vis = Layer::binary(2).unwrap();
        let mut hid = Layer::binary(1).unwrap();
        let mut weights = WeightSet::new(2, 1, &mut ZeroInitializer).unwrap();
        let data = Accumulator {
            pos_visible: arr1(&[1.0, 0.0]),
            pos_hidden: arr1(&[1.0]),
            neg_visible: arr1(&[0.5, 0.5]),
            neg_hidden: arr1(&[0.5]),
        };
        train(&mut vis, &mut hid, &data, &rate(), &mut weights).unwrap();
        assert_abs_diff_eq!(weights.weight(0, 0).unwrap(), 0.1 * 0.75);
        assert_abs_diff_eq!(weights.weight(1, 0).unwrap(), 0.1 * -0.25);
        assert_abs_diff_eq!(vis.bias(0).unwrap(), 0.2 * 0.5);
        assert_abs_diff_eq!(vis.bias(1).unwrap(), 0.2 * -0.5);
        assert_abs_diff_eq!(hid.bias(0).unwrap(), 0.2 * 0.5);
    }

    #[test]
    fn equal_phases_leave_only_momentum_and_decay() {
        let mut vis = Layer::gaussian(1).unwrap();
        let mut hid = Layer::gaussian(1).unwrap();
        let mut init = ConstantInitializer {
            weight: 1.0,
            bias: 0.0,
        };
        let mut weights = WeightSet::new(1, 1, &mut init).unwrap();
        let data = Accumulator {
            pos_visible: arr1(&[0.3]),
            pos_hidden: arr1(&[0.7]),
            neg_visible: arr1(&[0.3]),
            neg_hidden: arr1(&[0.7]),
        };
        let rate = rate();
        let mut expected_weight = 1.0;
        let mut expected_change = 0.0;
        for _ in 0..20 {
            train(&mut vis, &mut hid, &data, &rate, &mut weights).unwrap();
            expected_change = rate.weight_momentum * expected_change - WEIGHT_DECAY * expected_weight;
            expected_weight += expected_change;
            assert_abs_diff_eq!(weights.weight_change(0, 0).unwrap(), expected_change, epsilon = 1e-12);
            assert_abs_diff_eq!(weights.weight(0, 0).unwrap(), expected_weight, epsilon = 1e-12);
        }
        assert_eq!(vis.bias(0).unwrap(), 0.0);
        assert_eq!(hid.bias(0).unwrap(), 0.0);
    }

    #[test]
    fn rejects_mismatched_pair() {
        let mut vis = Layer::binary(3).unwrap();
        let mut hid = Layer::binary(1).unwrap();
        let mut weights = WeightSet::new(2, 1, &mut ZeroInitializer).unwrap();
        let data = Accumulator::new(2, 1);
        assert!(train(&mut vis, &mut hid, &data, &rate(), &mut weights).is_err());
    }

    #[test]
    fn accumulate_and_scale() {
        let mut acc = Accumulator::new(2, 1);
        acc.add_positive(arr1(&[1.0, 2.0]).view(), arr1(&[4.0]).view()).unwrap();
        acc.add_positive(arr1(&[3.0, 2.0]).view(), arr1(&[0.0]).view()).unwrap();
        acc.add_negative(arr1(&[1.0, 1.0]).view(), arr1(&[2.0]).view()).unwrap();
        acc.scale(0.5);
        assert_eq!(acc.pos_visible, arr1(&[2.0, 2.0]));
        assert_eq!(acc.pos_hidden, arr1(&[2.0]));
        assert_eq!(acc.neg_visible, arr1(&[0.5, 0.5]));
        assert_abs_diff_eq!(acc.visible_error().unwrap(), 2.25);
        acc.zero();
        assert_eq!(acc, Accumulator::new(2, 1));
        assert!(acc.add_negative(arr1(&[1.0]).view(), arr1(&[1.0]).view()).is_err());
    }
}
