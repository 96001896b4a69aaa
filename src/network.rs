//! The network: a population of LIF neurons, their connectivity and the global clock.
//!
//! All neurons advance in lockstep. At every step, in ascending neuron order:
//! 1. each neuron receives its background noise in the slot read at the current step,
//! 2. each neuron consumes that slot and updates its potential,
//! 3. each spiking neuron is logged (after the start step) and adds +1 (excitatory) or -g
//!    (inhibitory) to the slot its targets read `DELAY_STEPS` steps later.
//!
//! Then the clock and the shared buffer positions move one step forward. Recurrent spikes are
//! delayed while noise is not: noise stands for a population outside of the delay pipeline.
//!
//! # Examples
//!
//! ```rust
//! use lif_network::network::Network;
//! use lif_network::spike_log::SpikeRecord;
//!
//! let mut network = Network::build(true, 5.0, 2.0, 100, 42).unwrap();
//! network.create_network().unwrap();
//!
//! let mut spikes: Vec<SpikeRecord> = Vec::new();
//! network.run(0, 1000, &mut spikes).unwrap();
//! assert_eq!(network.clock(), 1000);
//! ```
use derivative::Derivative;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::buffer::RingCursor;
use crate::connectivity::{num_inputs_from, Connectivity};
use crate::error::SNNError;
use crate::neuron::{Neuron, Polarity};
use crate::noise::NoiseSource;
use crate::spike_log::SpikeSink;
use crate::MIN_NEURONS;

/// A sparse random network of excitatory and inhibitory LIF neurons.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Network {
    background_noise: bool,
    g: f64,
    eta: f64,
    num_neurons: usize,
    num_excitatory: usize,
    num_inhibitory: usize,
    num_exc_inputs: usize,
    num_inh_inputs: usize,
    noise: Option<NoiseSource>,
    clock: u64,
    cursor: RingCursor,
    parallel: bool,
    hand_wired: bool,
    #[derivative(Debug = "ignore")]
    neurons: Vec<Neuron>,
    #[derivative(Debug = "ignore")]
    connectivity: Connectivity,
    #[derivative(Debug = "ignore")]
    rng: ChaCha8Rng,
}

impl Network {
    /// Configure a random network of `num_neurons` neurons, 80% of which are excitatory.
    ///
    /// The neurons and their connections are only generated by [`Network::create_network`].
    /// The `seed` drives both the connectivity and the background noise.
    /// The function returns an error if `g` is not positive, if `num_neurons` is below
    /// [`MIN_NEURONS`], or if the background noise is enabled with an invalid `eta`.
    pub fn build(
        background_noise: bool,
        g: f64,
        eta: f64,
        num_neurons: usize,
        seed: u64,
    ) -> Result<Self, SNNError> {
        check_inhibition(g)?;
        if num_neurons < MIN_NEURONS {
            return Err(SNNError::InvalidParameter(format!(
                "A random network needs at least {} neurons, got {}",
                MIN_NEURONS, num_neurons
            )));
        }

        let num_excitatory = num_neurons * 4 / 5;
        let num_inhibitory = num_neurons - num_excitatory;
        let num_exc_inputs = num_inputs_from(num_excitatory);
        let num_inh_inputs = num_inputs_from(num_inhibitory);

        let noise = match background_noise {
            true => Some(NoiseSource::build(eta, num_exc_inputs)?),
            false => None,
        };

        Ok(Network {
            background_noise,
            g,
            eta,
            num_neurons,
            num_excitatory,
            num_inhibitory,
            num_exc_inputs,
            num_inh_inputs,
            noise,
            clock: 0,
            cursor: RingCursor::new(),
            parallel: false,
            hand_wired: false,
            neurons: vec![],
            connectivity: Connectivity::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Assemble a network from explicit neurons and connections, without background noise.
    /// The population size rule of random networks does not apply, and such a network cannot be
    /// regenerated with [`Network::create_network`] or [`Network::create_network_with`].
    /// The function returns an error if there is no neuron, if the connectivity does not cover
    /// exactly the given neurons, or if `g` is not positive.
    pub fn new_from(
        neurons: Vec<Neuron>,
        connectivity: Connectivity,
        g: f64,
        seed: u64,
    ) -> Result<Self, SNNError> {
        check_inhibition(g)?;
        if neurons.is_empty() {
            return Err(SNNError::InvalidParameter(
                "A network needs at least one neuron".to_string(),
            ));
        }
        if connectivity.num_neurons() != neurons.len() {
            return Err(SNNError::InvalidParameter(format!(
                "The connectivity covers {} neurons but {} neurons were provided",
                connectivity.num_neurons(),
                neurons.len()
            )));
        }

        let num_neurons = neurons.len();
        let num_excitatory = neurons.iter().filter(|neuron| neuron.is_excitatory()).count();
        let num_inhibitory = num_neurons - num_excitatory;

        Ok(Network {
            background_noise: false,
            g,
            eta: 0.0,
            num_neurons,
            num_excitatory,
            num_inhibitory,
            num_exc_inputs: num_inputs_from(num_excitatory),
            num_inh_inputs: num_inputs_from(num_inhibitory),
            noise: None,
            clock: 0,
            cursor: RingCursor::new(),
            parallel: false,
            hand_wired: true,
            neurons,
            connectivity,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Generate the neurons and a random fixed in-degree connectivity.
    ///
    /// Any previous neurons, connections and buffered input are dropped, and the clock is reset.
    /// The function returns an error if the network was assembled with [`Network::new_from`].
    pub fn create_network(&mut self) -> Result<(), SNNError> {
        self.check_generated()?;
        let connectivity =
            Connectivity::rand_fin(self.num_excitatory, self.num_inhibitory, &mut self.rng)?;
        self.create_network_with(connectivity)
    }

    /// Generate the neurons and connect them with the given connectivity, e.g., loaded from a
    /// previous run.
    ///
    /// Any previous neurons, connections and buffered input are dropped, and the clock is reset.
    /// The function returns an error if the connectivity does not cover the network, or if the
    /// network was assembled with [`Network::new_from`].
    pub fn create_network_with(&mut self, connectivity: Connectivity) -> Result<(), SNNError> {
        self.check_generated()?;
        if connectivity.num_neurons() != self.num_neurons {
            return Err(SNNError::InvalidParameter(format!(
                "The connectivity covers {} neurons but the network has {}",
                connectivity.num_neurons(),
                self.num_neurons
            )));
        }

        self.neurons = (0..self.num_neurons)
            .map(|id| match id < self.num_excitatory {
                true => Neuron::new(Polarity::Excitatory),
                false => Neuron::new(Polarity::Inhibitory),
            })
            .collect();
        self.connectivity = connectivity;
        self.clock = 0;
        self.cursor = RingCursor::new();

        log::info!(
            "Network created: {} excitatory and {} inhibitory neurons, {} connections",
            self.num_excitatory,
            self.num_inhibitory,
            self.connectivity.num_connections()
        );
        Ok(())
    }

    /// Advance the network by one step and returns the neurons that fired, in ascending order.
    /// Spikes are reported to the sink only if the current step is after `start_step`.
    ///
    /// The function returns an error if the network has no neuron or if the sink fails. A sink
    /// failure happens after the step is complete: the network can keep running, only the
    /// spikes of that step that were not yet recorded are missing from the log.
    pub fn step<S: SpikeSink>(&mut self, start_step: u64, sink: &mut S) -> Result<Vec<usize>, SNNError> {
        if self.neurons.is_empty() {
            return Err(SNNError::InvariantViolation(
                "Cannot update a network without neurons".to_string(),
            ));
        }

        let read = self.cursor.read();
        let write = self.cursor.write();
        let clock = self.clock;

        // Noise is drawn sequentially so that a seed yields the same run with or without rayon
        if let Some(noise) = &self.noise {
            for neuron in self.neurons.iter_mut() {
                neuron.deposit(read, noise.sample(&mut self.rng));
            }
        }

        // Updates only touch the read slot, deposits only the write slot
        let spiking: Vec<usize> = if self.parallel {
            self.neurons
                .par_iter_mut()
                .enumerate()
                .filter_map(|(id, neuron)| neuron.update(read, clock).then_some(id))
                .collect()
        } else {
            self.neurons
                .iter_mut()
                .enumerate()
                .filter_map(|(id, neuron)| neuron.update(read, clock).then_some(id))
                .collect()
        };

        for &source_id in spiking.iter() {
            let amplitude = self.neurons[source_id].polarity().amplitude(self.g);
            for &target_id in self.connectivity.targets(source_id) {
                self.neurons[target_id].deposit(write, amplitude);
            }
        }

        self.clock += 1;
        self.cursor.advance();

        if clock > start_step {
            for &source_id in spiking.iter() {
                sink.record(clock, source_id)?;
            }
        }

        Ok(spiking)
    }

    /// Run the simulation until the clock reaches `stop_step`, reporting to the sink the spikes
    /// emitted after `start_step`.
    /// The function returns an error if `start_step >= stop_step`, if the network has no neuron,
    /// or if the sink fails.
    pub fn run<S: SpikeSink>(
        &mut self,
        start_step: u64,
        stop_step: u64,
        sink: &mut S,
    ) -> Result<(), SNNError> {
        if start_step >= stop_step {
            return Err(SNNError::InvalidParameter(format!(
                "The start step ({}) must precede the stop step ({})",
                start_step, stop_step
            )));
        }
        if self.neurons.is_empty() {
            return Err(SNNError::InvariantViolation(
                "Cannot run a network without neurons, see `create_network`".to_string(),
            ));
        }

        log::info!(
            "Starting simulation from step {} to step {} (logging after step {})...",
            self.clock,
            stop_step,
            start_step
        );

        let first_step = self.clock;
        let log_interval = ((stop_step.saturating_sub(first_step)) / 10).max(1);
        let mut num_spikes = 0;

        while self.clock < stop_step {
            num_spikes += self.step(start_step, sink)?.len();

            if (self.clock - first_step) % log_interval == 0 {
                log::debug!(
                    "Simulation progress: step {}/{} ({} spikes so far)",
                    self.clock,
                    stop_step,
                    num_spikes
                );
            }
        }

        log::info!(
            "Simulation completed successfully! {} spikes in {} steps",
            num_spikes,
            self.clock - first_step
        );
        Ok(())
    }

    /// Returns true if the neurons receive Poisson background noise.
    pub fn background_noise(&self) -> bool {
        self.background_noise
    }

    /// Returns the relative strength of inhibition.
    pub fn g(&self) -> f64 {
        self.g
    }

    /// Returns the ratio between the external and the threshold rates.
    pub fn eta(&self) -> f64 {
        self.eta
    }

    /// Returns the external rate, or zero without background noise.
    pub fn external_rate(&self) -> f64 {
        self.noise
            .as_ref()
            .map(|noise| noise.external_rate())
            .unwrap_or(0.0)
    }

    /// Returns the number of neurons.
    pub fn num_neurons(&self) -> usize {
        self.num_neurons
    }

    /// Returns the number of excitatory neurons.
    pub fn num_excitatory(&self) -> usize {
        self.num_excitatory
    }

    /// Returns the number of inhibitory neurons.
    pub fn num_inhibitory(&self) -> usize {
        self.num_inhibitory
    }

    /// Returns the number of excitatory connections received by each neuron (Ce).
    pub fn num_exc_inputs(&self) -> usize {
        self.num_exc_inputs
    }

    /// Returns the number of inhibitory connections received by each neuron (Ci).
    pub fn num_inh_inputs(&self) -> usize {
        self.num_inh_inputs
    }

    /// Returns the current step.
    pub fn clock(&self) -> u64 {
        self.clock
    }

    /// Returns the shared buffer positions.
    pub fn cursor(&self) -> RingCursor {
        self.cursor
    }

    /// Returns true if the neuron updates run in parallel.
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Enable or disable parallel neuron updates. Results do not depend on it.
    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    /// Returns a slice of the neurons, by index.
    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    /// Returns a reference to the specified neuron, if it exists.
    pub fn neuron_ref(&self, neuron_id: usize) -> Option<&Neuron> {
        self.neurons.get(neuron_id)
    }

    /// Returns a mutable reference to the specified neuron, if it exists.
    pub fn neuron_mut(&mut self, neuron_id: usize) -> Option<&mut Neuron> {
        self.neurons.get_mut(neuron_id)
    }

    /// Returns the connectivity of the network.
    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    fn check_generated(&self) -> Result<(), SNNError> {
        if self.hand_wired {
            return Err(SNNError::InvalidParameter(
                "A network assembled from explicit neurons cannot be regenerated".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_inhibition(g: f64) -> Result<(), SNNError> {
    if !(g.is_finite() && g > 0.0) {
        return Err(SNNError::InvalidParameter(format!(
            "g must be a positive real number, got {}",
            g
        )));
    }
    Ok(())
}
