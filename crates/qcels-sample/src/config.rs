//! Serde selector for the sampler injected into a run.

use qcels_core::errors::QcelsError;
use qcels_core::{RngHandle, SpectralModel};
use serde::{Deserialize, Serialize};

use crate::circuit::{CircuitCostModel, SimulatedCircuitSampler};
use crate::theory::TheorySampler;
use crate::Sampler;

/// Sampler choice as written in a run configuration.
///
/// Hardware samplers need a live [`crate::ShotBackend`] and are therefore
/// built in code with [`crate::HardwareSampler::new`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SamplerConfig {
    /// Closed-form probabilities with binomial noise.
    Theory,
    /// Simulated circuits with phase-only reconstruction.
    SimulatedCircuit {
        /// Depth proxy used as the reported cost.
        #[serde(default)]
        cost: CircuitCostModel,
    },
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig::Theory
    }
}

/// Builds the configured sampler over `model`.
pub fn build_sampler(
    config: &SamplerConfig,
    model: &SpectralModel,
    nsample: usize,
    rng: RngHandle,
) -> Result<Box<dyn Sampler>, QcelsError> {
    Ok(match config {
        SamplerConfig::Theory => Box::new(TheorySampler::new(model.clone(), nsample, rng)?),
        SamplerConfig::SimulatedCircuit { cost } => Box::new(SimulatedCircuitSampler::new(
            model.clone(),
            nsample,
            cost.clone(),
            rng,
        )?),
    })
}
