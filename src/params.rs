//! Simulation parameters and their loader.
//!
//! A parameter file holds five whitespace-separated numbers, in this order:
//!
//! ```text
//! g eta num_neurons start_time stop_time
//! ```
//!
//! where `g` is the relative strength of inhibition, `eta` the ratio between the external and the
//! threshold rates, and the times are in ms. Spikes are only logged after `start_time`.
//!
//! # Examples
//!
//! ```rust
//! use lif_network::params::SimulationParams;
//!
//! let params: SimulationParams = "5 2 12500 100 1000".parse().unwrap();
//! assert_eq!(params.num_neurons, 12500);
//! assert_eq!(params.start_step(), 1000);
//! assert_eq!(params.stop_step(), 10000);
//! ```
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::SNNError;
use crate::{MIN_NEURONS, STEP_SIZE};

const FIELDS: [&str; 5] = ["g", "eta", "num_neurons", "start_time", "stop_time"];

/// The parameters of a simulation run.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SimulationParams {
    /// The relative strength of inhibitory spikes.
    pub g: f64,
    /// The ratio between the external rate and the threshold rate.
    pub eta: f64,
    /// The number of neurons.
    pub num_neurons: usize,
    /// The time after which spikes are logged, in ms.
    pub start_time: u64,
    /// The time at which the simulation stops, in ms.
    pub stop_time: u64,
}

impl SimulationParams {
    /// Create a validated set of parameters.
    pub fn build(
        g: f64,
        eta: f64,
        num_neurons: usize,
        start_time: u64,
        stop_time: u64,
    ) -> Result<Self, SNNError> {
        let params = SimulationParams {
            g,
            eta,
            num_neurons,
            start_time,
            stop_time,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check the parameters and returns an error naming the first invalid one.
    pub fn validate(&self) -> Result<(), SNNError> {
        if !(self.g.is_finite() && self.g > 0.0) {
            return Err(SNNError::InvalidParameter(format!(
                "g must be a positive real number, got {}",
                self.g
            )));
        }
        if !(self.eta.is_finite() && self.eta > 0.0) {
            return Err(SNNError::InvalidParameter(format!(
                "eta must be a positive real number, got {}",
                self.eta
            )));
        }
        if self.num_neurons < MIN_NEURONS {
            return Err(SNNError::InvalidParameter(format!(
                "num_neurons must be at least {} for the 0.8:0.2 excitatory:inhibitory split, got {}",
                MIN_NEURONS, self.num_neurons
            )));
        }
        if self.start_time >= self.stop_time {
            return Err(SNNError::InvalidParameter(format!(
                "stop_time ({}) must be greater than start_time ({})",
                self.stop_time, self.start_time
            )));
        }
        Ok(())
    }

    /// Load the parameters from a file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SNNError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            SNNError::IOError(format!(
                "Cannot read parameter file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        content.parse()
    }

    /// Returns the step after which spikes are logged.
    pub fn start_step(&self) -> u64 {
        to_steps(self.start_time)
    }

    /// Returns the step at which the simulation stops.
    pub fn stop_step(&self) -> u64 {
        to_steps(self.stop_time)
    }
}

impl FromStr for SimulationParams {
    type Err = SNNError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();
        let mut values = [0.0; 5];
        for (value, name) in values.iter_mut().zip(FIELDS) {
            let token = tokens.next().ok_or_else(|| {
                SNNError::InvalidParameter(format!("Missing value for {}", name))
            })?;
            *value = token.parse::<f64>().map_err(|_| {
                SNNError::InvalidParameter(format!("{} must be a number, got `{}`", name, token))
            })?;
            if !value.is_finite() || *value < 0.0 {
                return Err(SNNError::InvalidParameter(format!(
                    "{} must be a non-negative number, got `{}`",
                    name, token
                )));
            }
        }
        if let Some(token) = tokens.next() {
            return Err(SNNError::InvalidParameter(format!(
                "Unexpected value `{}` after stop_time",
                token
            )));
        }

        let [g, eta, num_neurons, start_time, stop_time] = values;
        SimulationParams::build(
            g,
            eta,
            as_integer(num_neurons, "num_neurons")? as usize,
            as_integer(start_time, "start_time")?,
            as_integer(stop_time, "stop_time")?,
        )
    }
}

fn as_integer(value: f64, name: &str) -> Result<u64, SNNError> {
    if value.fract() != 0.0 || value > u64::MAX as f64 {
        return Err(SNNError::InvalidParameter(format!(
            "{} must be a non-negative integer, got {}",
            name, value
        )));
    }
    Ok(value as u64)
}

/// Convert a time in ms to a number of steps, rounding up.
pub fn to_steps(time: u64) -> u64 {
    (time as f64 / STEP_SIZE).ceil() as u64
}
