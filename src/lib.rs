//! This crate simulates a sparse random network of leaky integrate-and-fire (LIF) neurons with
//! a fixed synaptic delay and optional Poisson background noise.
//!
//! Time is discrete: every neuron is updated once per step of [`STEP_SIZE`] ms, in ascending
//! index order, and spikes reach their targets exactly [`DELAY_STEPS`] steps later.
//!
//! # Creating Networks
//!
//! ## At Random
//!
//! ```rust
//! use lif_network::network::Network;
//!
//! // A network of 100 neurons (80 excitatory, 20 inhibitory) with g = 5 and eta = 2
//! let mut network = Network::build(true, 5.0, 2.0, 100, 42).unwrap();
//! network.create_network().unwrap();
//!
//! assert_eq!(network.num_excitatory(), 80);
//! assert_eq!(network.num_inhibitory(), 20);
//! // Each neuron receives 8 excitatory and 2 inhibitory connections
//! assert_eq!(network.connectivity().num_connections(), 100 * (8 + 2));
//! ```
//!
//! ## By Hand
//!
//! ```rust
//! use lif_network::connectivity::Connectivity;
//! use lif_network::network::Network;
//! use lif_network::neuron::{Neuron, Polarity};
//!
//! let neurons = vec![Neuron::new(Polarity::Excitatory), Neuron::new(Polarity::Inhibitory)];
//! let connectivity = Connectivity::from_targets(vec![vec![1], vec![]]).unwrap();
//! let network = Network::new_from(neurons, connectivity, 5.0, 0).unwrap();
//!
//! assert_eq!(network.num_neurons(), 2);
//! ```
//!
//! # Simulating Networks
//!
//! ```rust
//! use lif_network::network::Network;
//! use lif_network::spike_log::SpikeRecord;
//!
//! let mut network = Network::build(true, 5.0, 2.0, 100, 7).unwrap();
//! network.create_network().unwrap();
//!
//! // Run 50 ms and keep the spikes emitted after step 100
//! let mut spikes: Vec<SpikeRecord> = Vec::new();
//! network.run(100, 500, &mut spikes).unwrap();
//!
//! assert_eq!(network.clock(), 500);
//! assert!(spikes.iter().all(|spike| spike.step > 100 && spike.step < 500));
//! ```

pub mod buffer;
pub mod connectivity;
pub mod error;
pub mod network;
pub mod neuron;
pub mod noise;
pub mod params;
pub mod spike_log;

/// The duration of one simulation step, in ms.
pub const STEP_SIZE: f64 = 0.1;
/// The membrane time constant (tau = R * C), in ms.
pub const MEMBRANE_TIME_CONSTANT: f64 = 20.0;
/// The membrane capacitance.
pub const CAPACITANCE: f64 = 1.0;
/// The membrane resistance.
pub const RESISTANCE: f64 = MEMBRANE_TIME_CONSTANT / CAPACITANCE;
/// The potential at which a neuron fires, in mV.
pub const FIRING_THRESHOLD: f64 = 20.0;
/// The potential a neuron is set to right after firing, in mV.
pub const RESET_POTENTIAL: f64 = 0.0;
/// The potential jump caused by one excitatory input spike, in mV.
pub const SYNAPTIC_WEIGHT: f64 = 0.1;
/// The refractory period, in ms.
pub const REFRACTORY_TIME: f64 = 2.0;
/// The refractory period in steps, i.e., `ceil(REFRACTORY_TIME / STEP_SIZE)`.
pub const REFRACTORY_STEPS: u64 = 20;
/// The synaptic transmission delay, in ms.
pub const DELAY: f64 = 1.5;
/// The synaptic transmission delay in steps, i.e., `ceil(DELAY / STEP_SIZE)`.
pub const DELAY_STEPS: usize = 15;
/// The number of slots of a delay buffer.
pub const BUFFER_LENGTH: usize = DELAY_STEPS + 1;
/// The fraction of each population a neuron receives connections from.
pub const CONNECTION_DENSITY: f64 = 0.1;
/// The smallest network that can be generated at random.
pub const MIN_NEURONS: usize = 50;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_counts_match_durations() {
        assert_eq!((REFRACTORY_TIME / STEP_SIZE).ceil() as u64, REFRACTORY_STEPS);
        assert_eq!((DELAY / STEP_SIZE).ceil() as usize, DELAY_STEPS);
        assert_eq!(BUFFER_LENGTH, 16);
        assert_eq!(RESISTANCE, 20.0);
    }
}
