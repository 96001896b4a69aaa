//! Poisson background noise.
//!
//! The background activity models `Ce` external excitatory neurons firing independently at rate
//! `Vext`. It is expressed relative to the rate `Vthr` at which `Ce` inputs alone would bring a
//! neuron to threshold: `Vext = eta * Ce * Vthr` with `Vthr = threshold / (Ce * Je * tau)`.
//! At every step, each neuron receives a Poisson number of external spikes with mean `Vext * h`.
use rand::Rng;
use rand_distr::{Distribution, Poisson};

use crate::error::SNNError;
use crate::{FIRING_THRESHOLD, MEMBRANE_TIME_CONSTANT, STEP_SIZE, SYNAPTIC_WEIGHT};

/// Returns the rate at which `num_exc_inputs` excitatory inputs bring a neuron to threshold.
pub fn threshold_rate(num_exc_inputs: usize) -> f64 {
    FIRING_THRESHOLD / (num_exc_inputs as f64 * SYNAPTIC_WEIGHT * MEMBRANE_TIME_CONSTANT)
}

/// A source of external Poisson spikes.
#[derive(Debug, Clone)]
pub struct NoiseSource {
    external_rate: f64,
    distr: Poisson<f64>,
}

impl NoiseSource {
    /// Create a noise source for neurons receiving `num_exc_inputs` excitatory connections,
    /// with `eta` the ratio between the external rate and the threshold rate.
    /// The function returns an error if the resulting rate is not positive and finite.
    pub fn build(eta: f64, num_exc_inputs: usize) -> Result<Self, SNNError> {
        if num_exc_inputs == 0 {
            return Err(SNNError::InvalidParameter(
                "Background noise needs at least one excitatory input per neuron".to_string(),
            ));
        }

        let external_rate = eta * num_exc_inputs as f64 * threshold_rate(num_exc_inputs);
        let distr = Poisson::new(external_rate * STEP_SIZE).map_err(|e| {
            SNNError::InvalidParameter(format!(
                "Invalid external rate {} (eta = {}): {}",
                external_rate, eta, e
            ))
        })?;

        Ok(NoiseSource {
            external_rate,
            distr,
        })
    }

    /// Returns the external rate `Vext`, in spikes per ms.
    pub fn external_rate(&self) -> f64 {
        self.external_rate
    }

    /// Returns the mean number of external spikes per step.
    pub fn mean(&self) -> f64 {
        self.external_rate * STEP_SIZE
    }

    /// Draw the number of external spikes received during one step.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        self.distr.sample(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_rates() {
        assert!((threshold_rate(1000) - 0.01).abs() < 1e-15);

        let noise = NoiseSource::build(2.0, 1000).unwrap();
        assert!((noise.external_rate() - 20.0).abs() < 1e-12);
        assert!((noise.mean() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_noise() {
        assert!(matches!(
            NoiseSource::build(2.0, 0),
            Err(SNNError::InvalidParameter(_))
        ));
        assert!(matches!(
            NoiseSource::build(0.0, 1000),
            Err(SNNError::InvalidParameter(_))
        ));
        assert!(matches!(
            NoiseSource::build(f64::NAN, 1000),
            Err(SNNError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_samples() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let noise = NoiseSource::build(2.0, 1000).unwrap();

        let samples: Vec<f64> = (0..20_000).map(|_| noise.sample(&mut rng)).collect();
        assert!(samples.iter().all(|&s| s >= 0.0 && s.fract() == 0.0));

        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        assert!((mean - 2.0).abs() < 0.05);
    }
}
