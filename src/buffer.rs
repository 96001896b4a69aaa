//! Fixed-length circular buffers carrying delayed synaptic input.
//!
//! Every neuron owns a [`DelayBuffer`] of [`BUFFER_LENGTH`] slots, one per step of the delay
//! window. The network owns a single [`RingCursor`] whose read and write positions are shared by
//! all buffers: the read slot is the input for the current step, the write slot the input for the
//! step `DELAY_STEPS` ahead.
use serde::{Deserialize, Serialize};

use crate::{BUFFER_LENGTH, DELAY_STEPS};

/// The accumulated synaptic input of a neuron over the delay window.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct DelayBuffer {
    slots: Vec<f64>,
}

impl DelayBuffer {
    /// Create a zeroed buffer with [`BUFFER_LENGTH`] slots.
    pub fn new() -> Self {
        DelayBuffer {
            slots: vec![0.0; BUFFER_LENGTH],
        }
    }

    /// Returns the number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false: a buffer has at least one slot.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the content of the slot without consuming it.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= BUFFER_LENGTH`.
    pub fn peek(&self, slot: usize) -> f64 {
        self.slots[slot]
    }

    /// Add a contribution to the slot.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= BUFFER_LENGTH`.
    pub fn deposit(&mut self, slot: usize, amount: f64) {
        self.slots[slot] += amount;
    }

    /// Read the slot and clear it. Each slot is read exactly once per pass around the ring.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= BUFFER_LENGTH`.
    pub fn take(&mut self, slot: usize) -> f64 {
        std::mem::take(&mut self.slots[slot])
    }

    /// Returns a slice of all slots, in storage order.
    pub fn slots(&self) -> &[f64] {
        &self.slots
    }
}

impl Default for DelayBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// The pair of read/write positions shared by all delay buffers of a network.
/// The write position always leads the read position by [`DELAY_STEPS`] modulo [`BUFFER_LENGTH`].
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct RingCursor {
    read: usize,
    write: usize,
}

impl RingCursor {
    /// Create a cursor reading slot 0 and writing slot [`DELAY_STEPS`].
    pub fn new() -> Self {
        RingCursor {
            read: 0,
            write: DELAY_STEPS,
        }
    }

    /// The slot holding the input for the current step.
    pub fn read(&self) -> usize {
        self.read
    }

    /// The slot holding the input for the step `DELAY_STEPS` ahead.
    pub fn write(&self) -> usize {
        self.write
    }

    /// Move both positions one slot forward, wrapping at [`BUFFER_LENGTH`].
    pub fn advance(&mut self) {
        self.read = (self.read + 1) % BUFFER_LENGTH;
        self.write = (self.write + 1) % BUFFER_LENGTH;
    }
}

impl Default for RingCursor {
    fn default() -> Self {
        Self::new()
    }
}
