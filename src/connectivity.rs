//! Module implementing the connectivity graph of a network.
//!
//! The graph is stored as an adjacency list: for each source neuron, the ordered list of the
//! neurons it projects to. Self-connections and parallel connections are allowed.
//!
//! # Examples
//!
//! ```rust
//! use lif_network::connectivity::Connectivity;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let connectivity = Connectivity::rand_fin(80, 20, &mut rng).unwrap();
//!
//! assert_eq!(connectivity.num_neurons(), 100);
//! assert!(connectivity.in_degrees().iter().all(|&k| k == 8 + 2));
//! ```
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::ops::Range;
use std::path::Path;

use crate::error::SNNError;
use crate::{CONNECTION_DENSITY, MIN_NEURONS};

/// Returns the number of connections a neuron receives from a population of the given size,
/// i.e., `ceil(CONNECTION_DENSITY * population)`, computed in integers.
pub fn num_inputs_from(population: usize) -> usize {
    let inverse_density = (1.0 / CONNECTION_DENSITY).round() as usize;
    population.div_ceil(inverse_density)
}

/// A directed multigraph over the neurons of a network.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct Connectivity {
    targets: Vec<Vec<usize>>,
}

impl Connectivity {
    /// Create a graph without connections over the given number of neurons.
    pub fn new_empty(num_neurons: usize) -> Self {
        Connectivity {
            targets: vec![vec![]; num_neurons],
        }
    }

    /// Create a graph from explicit target lists, one per source neuron.
    /// The function returns an error if a target does not exist.
    pub fn from_targets(targets: Vec<Vec<usize>>) -> Result<Self, SNNError> {
        let num_neurons = targets.len();
        for (source_id, source_targets) in targets.iter().enumerate() {
            if let Some(&target_id) = source_targets.iter().find(|&&t| t >= num_neurons) {
                return Err(SNNError::OutOfBounds(format!(
                    "Connection from neuron {} to non-existing neuron {}",
                    source_id, target_id
                )));
            }
        }
        Ok(Connectivity { targets })
    }

    /// Sample a random graph with a fixed in-degree.
    ///
    /// Neurons `0..num_excitatory` are excitatory, the following `num_inhibitory` ones inhibitory.
    /// Every neuron (as a target) draws `num_inputs_from(num_excitatory)` sources uniformly, with
    /// replacement, among the excitatory neurons, then `num_inputs_from(num_inhibitory)` sources
    /// among the inhibitory ones. Each draw appends the target to the source's list.
    ///
    /// The function returns an error if the network is too small, if there is no inhibitory neuron
    /// or if the excitatory population does not outnumber the inhibitory one.
    pub fn rand_fin<R: Rng>(
        num_excitatory: usize,
        num_inhibitory: usize,
        rng: &mut R,
    ) -> Result<Self, SNNError> {
        let num_neurons = num_excitatory + num_inhibitory;
        if num_neurons < MIN_NEURONS {
            return Err(SNNError::InvalidParameter(format!(
                "A random network needs at least {} neurons, got {}",
                MIN_NEURONS, num_neurons
            )));
        }
        if num_inhibitory == 0 || num_excitatory <= num_inhibitory {
            return Err(SNNError::InvariantViolation(format!(
                "The {} excitatory neurons must outnumber the {} inhibitory ones",
                num_excitatory, num_inhibitory
            )));
        }

        let num_exc_inputs = num_inputs_from(num_excitatory);
        let num_inh_inputs = num_inputs_from(num_inhibitory);
        let exc_dist = Uniform::new(0, num_excitatory);
        let inh_dist = Uniform::new(num_excitatory, num_neurons);

        let mut connectivity = Connectivity::new_empty(num_neurons);
        for target_id in 0..num_neurons {
            for _ in 0..num_exc_inputs {
                connectivity.targets[exc_dist.sample(rng)].push(target_id);
            }
            for _ in 0..num_inh_inputs {
                connectivity.targets[inh_dist.sample(rng)].push(target_id);
            }
        }

        log::debug!(
            "Sampled {} connections over {} neurons ({} excitatory and {} inhibitory inputs each)",
            connectivity.num_connections(),
            num_neurons,
            num_exc_inputs,
            num_inh_inputs
        );

        Ok(connectivity)
    }

    /// Returns the number of neurons in the graph.
    pub fn num_neurons(&self) -> usize {
        self.targets.len()
    }

    /// Returns the total number of connections.
    pub fn num_connections(&self) -> usize {
        self.targets.iter().map(|targets| targets.len()).sum()
    }

    /// Returns the targets of the specified neuron.
    ///
    /// # Panics
    ///
    /// Panics if `source_id` is not a neuron of the graph.
    pub fn targets(&self, source_id: usize) -> &[usize] {
        &self.targets[source_id]
    }

    /// Returns the number of outgoing connections of the specified neuron.
    ///
    /// # Panics
    ///
    /// Panics if `source_id` is not a neuron of the graph.
    pub fn out_degree(&self, source_id: usize) -> usize {
        self.targets[source_id].len()
    }

    /// Add a connection from `source_id` to `target_id`.
    /// The function returns an error if either neuron does not exist.
    pub fn add_connection(&mut self, source_id: usize, target_id: usize) -> Result<(), SNNError> {
        let num_neurons = self.num_neurons();
        if source_id >= num_neurons || target_id >= num_neurons {
            return Err(SNNError::OutOfBounds(format!(
                "Connection {} -> {} in a network of {} neurons",
                source_id, target_id, num_neurons
            )));
        }
        self.targets[source_id].push(target_id);
        Ok(())
    }

    /// Returns the number of incoming connections of every neuron.
    pub fn in_degrees(&self) -> Vec<usize> {
        self.in_degrees_from(0..self.num_neurons())
    }

    /// Returns the number of incoming connections of every neuron, counting only the connections
    /// whose source lies in the given range.
    ///
    /// # Panics
    ///
    /// Panics if the range goes past the last neuron of the graph.
    pub fn in_degrees_from(&self, sources: Range<usize>) -> Vec<usize> {
        let mut counts = vec![0; self.num_neurons()];
        for &target_id in self.targets[sources].iter().flatten() {
            counts[target_id] += 1;
        }
        counts
    }

    /// Save the graph to a JSON file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), SNNError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self).map_err(|e| SNNError::IOError(e.to_string()))?;
        writer.flush()?;
        Ok(())
    }

    /// Load a graph from a JSON file.
    /// The function returns an error if the file cannot be read or describes an invalid graph.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SNNError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let connectivity: Connectivity =
            serde_json::from_reader(reader).map_err(|e| SNNError::IOError(e.to_string()))?;
        Connectivity::from_targets(connectivity.targets)
    }
}
