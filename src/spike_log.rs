//! Spike log: where the network reports its spikes.
//!
//! The text format has one spike per line, `<step> <neuron_id>`, without header.
//! Lines are in increasing step order and, within a step, in ascending neuron order.
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::SNNError;
use crate::STEP_SIZE;

/// A spike emitted by a neuron at a given step.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub struct SpikeRecord {
    /// The step at which the neuron fired.
    pub step: u64,
    /// The index of the neuron in the network.
    pub neuron_id: usize,
}

impl SpikeRecord {
    pub fn new(step: u64, neuron_id: usize) -> Self {
        SpikeRecord { step, neuron_id }
    }

    /// Parse a line of the text format.
    pub fn parse_line(line: &str) -> Result<Self, SNNError> {
        let mut fields = line.split_whitespace();
        let (Some(step), Some(neuron_id), None) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(SNNError::InvalidParameter(format!(
                "Expected `<step> <neuron_id>`, got `{}`",
                line
            )));
        };
        let step = step
            .parse::<u64>()
            .map_err(|e| SNNError::InvalidParameter(format!("Invalid step `{}`: {}", step, e)))?;
        let neuron_id = neuron_id.parse::<usize>().map_err(|e| {
            SNNError::InvalidParameter(format!("Invalid neuron id `{}`: {}", neuron_id, e))
        })?;
        Ok(SpikeRecord { step, neuron_id })
    }
}

/// A destination for the spikes emitted during a simulation.
pub trait SpikeSink {
    /// Append a spike to the log.
    fn record(&mut self, step: u64, neuron_id: usize) -> Result<(), SNNError>;
}

impl SpikeSink for Vec<SpikeRecord> {
    fn record(&mut self, step: u64, neuron_id: usize) -> Result<(), SNNError> {
        self.push(SpikeRecord::new(step, neuron_id));
        Ok(())
    }
}

/// Writes spikes in the text format to any writer.
pub struct SpikeWriter<W: Write> {
    writer: W,
    num_spikes: usize,
}

impl SpikeWriter<BufWriter<File>> {
    /// Create (or truncate) the log file at the given path.
    /// The function returns an error if the file cannot be opened.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, SNNError> {
        let file = File::create(path.as_ref()).map_err(|e| {
            SNNError::IOError(format!(
                "Cannot open spike log {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Ok(SpikeWriter::new(BufWriter::new(file)))
    }
}

impl<W: Write> SpikeWriter<W> {
    pub fn new(writer: W) -> Self {
        SpikeWriter {
            writer,
            num_spikes: 0,
        }
    }

    /// Returns the number of spikes written so far.
    pub fn num_spikes(&self) -> usize {
        self.num_spikes
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), SNNError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and returns the underlying writer.
    pub fn into_inner(mut self) -> Result<W, SNNError> {
        self.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> SpikeSink for SpikeWriter<W> {
    fn record(&mut self, step: u64, neuron_id: usize) -> Result<(), SNNError> {
        writeln!(self.writer, "{} {}", step, neuron_id)?;
        self.num_spikes += 1;
        Ok(())
    }
}

/// Read a spike log back from a file. Blank lines are skipped.
pub fn read_spike_log<P: AsRef<Path>>(path: P) -> Result<Vec<SpikeRecord>, SNNError> {
    let file = File::open(path)?;
    BufReader::new(file)
        .lines()
        .filter(|line| !matches!(line, Ok(line) if line.trim().is_empty()))
        .map(|line| SpikeRecord::parse_line(&line?))
        .collect()
}

/// Returns the mean firing rate, in Hz, of `num_neurons` neurons that emitted `num_spikes`
/// spikes in total during `num_steps` steps.
pub fn firing_rate(num_spikes: usize, num_neurons: usize, num_steps: u64) -> f64 {
    if num_neurons == 0 || num_steps == 0 {
        return 0.0;
    }
    let duration_s = num_steps as f64 * STEP_SIZE / 1000.0;
    num_spikes as f64 / (num_neurons as f64 * duration_s)
}
