//! This module provides the `Neuron` structure which composes the `Network` structure.
//!
//! A neuron integrates its input with the exact discrete solution of the LIF membrane equation
//! over one step:
//!
//! `V(t + h) = decay * V(t) + I * diffusion + S * SYNAPTIC_WEIGHT`
//!
//! where `I` is the external bias current and `S` the number of (signed) input spikes delivered
//! at `t`. A neuron whose potential reached the threshold fires at its next update, is reset to
//! [`RESET_POTENTIAL`] and ignores all input during [`REFRACTORY_STEPS`] steps.
use serde::{Deserialize, Serialize};

use crate::buffer::DelayBuffer;
use crate::{
    FIRING_THRESHOLD, MEMBRANE_TIME_CONSTANT, REFRACTORY_STEPS, RESET_POTENTIAL, RESISTANCE,
    STEP_SIZE, SYNAPTIC_WEIGHT,
};

/// Returns the membrane decay factor over one step, i.e., `exp(-STEP_SIZE / MEMBRANE_TIME_CONSTANT)`.
pub fn decay() -> f64 {
    (-STEP_SIZE / MEMBRANE_TIME_CONSTANT).exp()
}

/// Returns the gain of the bias current over one step, i.e., `RESISTANCE * (1 - decay())`.
pub fn diffusion() -> f64 {
    RESISTANCE * (1.0 - decay())
}

/// The effect a neuron has on its targets.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize, Default)]
pub enum Polarity {
    /// Each spike adds +1 to the input of the targets.
    #[default]
    Excitatory,
    /// Each spike adds -g to the input of the targets.
    Inhibitory,
}

impl Polarity {
    /// Returns the contribution of one spike to the input buffer of a target,
    /// given the relative strength `g` of inhibition.
    pub fn amplitude(&self, g: f64) -> f64 {
        match self {
            Polarity::Excitatory => 1.0,
            Polarity::Inhibitory => -g,
        }
    }
}

/// Represents a leaky integrate-and-fire neuron.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Neuron {
    // The membrane potential, in mV.
    potential: f64,
    // Whether the neuron excites or inhibits its targets.
    polarity: Polarity,
    // The external bias current.
    bias: f64,
    // The step of the last spike, if any.
    last_spike: Option<u64>,
    // The delayed input, one slot per step of the delay window.
    buffer: DelayBuffer,
}

impl Neuron {
    /// Create a neuron at rest, without bias current and without input.
    pub fn new(polarity: Polarity) -> Self {
        Neuron {
            potential: RESET_POTENTIAL,
            polarity,
            bias: 0.0,
            last_spike: None,
            buffer: DelayBuffer::new(),
        }
    }

    /// Returns the membrane potential.
    pub fn potential(&self) -> f64 {
        self.potential
    }

    /// Returns the polarity of the neuron.
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Set the polarity of the neuron.
    pub fn set_polarity(&mut self, polarity: Polarity) {
        self.polarity = polarity;
    }

    /// Returns true if the neuron is excitatory.
    pub fn is_excitatory(&self) -> bool {
        self.polarity == Polarity::Excitatory
    }

    /// Returns the external bias current.
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Set the external bias current.
    pub fn set_bias(&mut self, bias: f64) {
        self.bias = bias;
    }

    /// Returns the step of the last spike, if any.
    pub fn last_spike(&self) -> Option<u64> {
        self.last_spike
    }

    /// Returns a reference to the delayed input buffer.
    pub fn buffer(&self) -> &DelayBuffer {
        &self.buffer
    }

    /// Add a contribution to the given slot of the delayed input buffer.
    pub fn deposit(&mut self, slot: usize, amount: f64) {
        self.buffer.deposit(slot, amount);
    }

    /// Returns true if the neuron is still refractory at the given step.
    pub fn is_refractory(&self, time: u64) -> bool {
        match self.last_spike {
            Some(last) => time.abs_diff(last) < REFRACTORY_STEPS,
            None => false,
        }
    }

    /// Advance the neuron by one step and returns true if it fires.
    ///
    /// The input stored at `slot` is consumed whatever the state of the neuron.
    /// A refractory neuron keeps its potential; otherwise, a neuron at or above threshold fires
    /// and is reset, and a neuron below threshold integrates its input.
    pub fn update(&mut self, slot: usize, time: u64) -> bool {
        let input = self.buffer.take(slot);

        if self.is_refractory(time) {
            return false;
        }

        if self.potential >= FIRING_THRESHOLD {
            self.potential = RESET_POTENTIAL;
            self.last_spike = Some(time);
            return true;
        }

        self.potential = decay() * self.potential + self.bias * diffusion() + input * SYNAPTIC_WEIGHT;
        false
    }
}

impl Default for Neuron {
    fn default() -> Self {
        Self::new(Polarity::default())
    }
}
