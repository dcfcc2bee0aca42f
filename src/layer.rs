use crate::activator::Activator;
use crate::error::{self, Error, Result};
use crate::random::RandomSource;

use itertools::izip;
use ndarray::{Array1, ArrayView1};

/// A single layer of neurons in a stacked RBM.
///
/// Every neuron carries a bias, the momentum term of its last bias update,
/// the state used for propagation and the activity (expected value) the state
/// was sampled from. All four vectors share the layer's size, which never
/// changes after construction.
#[derive(Clone, Debug)]
pub struct Layer {
    /// The rule used to turn net input into a state.
    activator: Activator,
    state: Array1<f64>,
    bias: Array1<f64>,
    bias_change: Array1<f64>,
    activity: Array1<f64>,
}

impl Layer {
    /// Creates a zeroed layer of `neurons` neurons.
    pub fn new(activator: Activator, neurons: usize) -> Result<Self> {
        if neurons == 0 {
            return Err(Error::InvalidArgument("can't have a layer with no neurons"));
        }
        Ok(Layer {
            activator,
            state: Array1::zeros(neurons),
            bias: Array1::zeros(neurons),
            bias_change: Array1::zeros(neurons),
            activity: Array1::zeros(neurons),
        })
    }

    /// Creates a layer of stochastic binary neurons.
    pub fn binary(neurons: usize) -> Result<Self> {
        Self::new(Activator::Binary, neurons)
    }

    /// Creates a layer of continuous Gaussian neurons.
    pub fn gaussian(neurons: usize) -> Result<Self> {
        Self::new(Activator::Gaussian, neurons)
    }

    /// Recreates a layer from its persisted biases. Everything else starts at
    /// zero.
    pub(crate) fn with_bias(activator: Activator, bias: Vec<f64>) -> Result<Self> {
        let mut layer = Self::new(activator, bias.len())?;
        layer.bias = Array1::from(bias);
        Ok(layer)
    }

    pub fn activator(&self) -> Activator {
        self.activator
    }

    /// Returns the number of neurons in the layer.
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Sets neuron `i` from its net input using the layer's activation rule.
    pub fn set_state(
        &mut self,
        i: usize,
        net_input: f64,
        random: &mut dyn RandomSource,
    ) -> Result<()> {
        self.check(i)?;
        let (state, activity) = self.activator.activate(net_input + self.bias[i], random);
        self.state[i] = state;
        self.activity[i] = activity;
        Ok(())
    }

    /// Forces both the state and the activity of neuron `i` to `value`.
    pub fn set_state_bypass(&mut self, i: usize, value: f64) -> Result<()> {
        self.check(i)?;
        self.state[i] = value;
        self.activity[i] = value;
        Ok(())
    }

    /// Clamps every neuron to the provided observation.
    pub fn clamp(&mut self, data: ArrayView1<f64>) -> Result<()> {
        error::same_len("layer data", data.len(), self.len())?;
        self.state.assign(&data);
        self.activity.assign(&data);
        Ok(())
    }

    /// Sets every neuron from the provided net inputs.
    pub(crate) fn activate(
        &mut self,
        net_input: &Array1<f64>,
        random: &mut dyn RandomSource,
    ) -> Result<()> {
        error::same_len("net input", net_input.len(), self.len())?;
        let activator = self.activator;
        for (state, activity, &bias, &input) in izip!(
            self.state.iter_mut(),
            self.activity.iter_mut(),
            self.bias.iter(),
            net_input.iter()
        ) {
            let (s, a) = activator.activate(input + bias, random);
            *state = s;
            *activity = a;
        }
        Ok(())
    }

    pub fn state(&self, i: usize) -> Result<f64> {
        self.check(i)?;
        Ok(self.state[i])
    }

    pub fn activity(&self, i: usize) -> Result<f64> {
        self.check(i)?;
        Ok(self.activity[i])
    }

    pub fn bias(&self, i: usize) -> Result<f64> {
        self.check(i)?;
        Ok(self.bias[i])
    }

    pub fn set_bias(&mut self, i: usize, bias: f64) -> Result<()> {
        self.check(i)?;
        self.bias[i] = bias;
        Ok(())
    }

    pub fn bias_change(&self, i: usize) -> Result<f64> {
        self.check(i)?;
        Ok(self.bias_change[i])
    }

    pub fn set_bias_change(&mut self, i: usize, change: f64) -> Result<()> {
        self.check(i)?;
        self.bias_change[i] = change;
        Ok(())
    }

    pub fn states(&self) -> ArrayView1<f64> {
        self.state.view()
    }

    pub fn activities(&self) -> ArrayView1<f64> {
        self.activity.view()
    }

    pub fn biases(&self) -> ArrayView1<f64> {
        self.bias.view()
    }

    /// Applies one momentum bias update per neuron:
    /// `change = momentum * change + rate * (positive - negative)`.
    pub(crate) fn train_biases(
        &mut self,
        rate: f64,
        momentum: f64,
        positive: ArrayView1<f64>,
        negative: ArrayView1<f64>,
    ) -> Result<()> {
        error::same_len("positive phase", positive.len(), self.len())?;
        error::same_len("negative phase", negative.len(), self.len())?;
        for (bias, change, &pos, &neg) in izip!(
            self.bias.iter_mut(),
            self.bias_change.iter_mut(),
            positive.iter(),
            negative.iter()
        ) {
            *change = momentum * *change + rate * (pos - neg);
            *bias += *change;
        }
        Ok(())
    }

    fn check(&self, i: usize) -> Result<()> {
        if i >= self.len() {
            return Err(Error::bounds("neuron index", i, self.len()));
        }
        Ok(())
    }
}
