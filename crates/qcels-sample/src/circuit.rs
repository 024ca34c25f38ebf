//! Simulated Hadamard-test circuits.
//!
//! The ancilla statistics of a controlled `e^{−iHt}` acting on `|ψ⟩` depend
//! only on the spectral decomposition of `|ψ⟩`, so the exact outcome
//! probabilities are taken from the model. Cost is reported as a circuit
//! depth proxy for the pair of circuits rather than as evolution time.

use qcels_core::errors::{require_positive_count, ErrorInfo, QcelsError};
use qcels_core::{RngHandle, SpectralModel};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{phase_only_estimate, validate_time, Sample, Sampler, SamplerKind};

fn default_base_depth() -> usize {
    4
}

fn default_depth_per_time() -> f64 {
    1.0
}

/// Depth proxy of one Hadamard-test circuit at evolution time `t`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CircuitCostModel {
    /// Depth of state preparation, ancilla rotations and measurement.
    #[serde(default = "default_base_depth")]
    pub base_depth: usize,
    /// Controlled-evolution layers per unit of evolution time.
    #[serde(default = "default_depth_per_time")]
    pub depth_per_time: f64,
}

impl Default for CircuitCostModel {
    fn default() -> Self {
        Self {
            base_depth: default_base_depth(),
            depth_per_time: default_depth_per_time(),
        }
    }
}

impl CircuitCostModel {
    /// Depth of a single circuit; the imaginary channel adds one `S†` layer.
    pub fn depth(&self, t: f64, imaginary: bool) -> usize {
        let evolution = (t * self.depth_per_time).ceil().max(1.0) as usize;
        self.base_depth + evolution + usize::from(imaginary)
    }

    fn validate(&self) -> Result<(), QcelsError> {
        if !self.depth_per_time.is_finite() || self.depth_per_time <= 0.0 {
            return Err(QcelsError::InvalidArgument(
                ErrorInfo::new(
                    "invalid-depth-rate",
                    "depth_per_time must be positive and finite",
                )
                .with_context("depth_per_time", self.depth_per_time),
            ));
        }
        Ok(())
    }
}

/// Shot-level simulation of the real and imaginary Hadamard circuits.
#[derive(Debug, Clone)]
pub struct SimulatedCircuitSampler {
    model: SpectralModel,
    nsample: usize,
    cost_model: CircuitCostModel,
    rng: RngHandle,
}

impl SimulatedCircuitSampler {
    /// Creates the sampler, rejecting `nsample = 0` up front.
    pub fn new(
        model: SpectralModel,
        nsample: usize,
        cost_model: CircuitCostModel,
        rng: RngHandle,
    ) -> Result<Self, QcelsError> {
        require_positive_count("nsample", nsample)?;
        cost_model.validate()?;
        Ok(Self {
            model,
            nsample,
            cost_model,
            rng,
        })
    }
}

impl Sampler for SimulatedCircuitSampler {
    fn kind(&self) -> SamplerKind {
        SamplerKind::SimulatedCircuit
    }

    fn sample(&mut self, t: f64) -> Result<Sample, QcelsError> {
        validate_time(t)?;
        let z = self.model.signal(t);
        let shots = self.nsample as f64;
        // Ancilla reads 0 with probability (1 + Re z)/2 on the real circuit.
        let re_zeros = self.rng.binomial(self.nsample, (1.0 + z.re) / 2.0) as f64;
        let im_zeros = self.rng.binomial(self.nsample, (1.0 + z.im) / 2.0) as f64;
        let value = phase_only_estimate(2.0 * re_zeros / shots - 1.0, 2.0 * im_zeros / shots - 1.0);
        let depth = self.cost_model.depth(t, false) + self.cost_model.depth(t, true);
        debug!(t, depth, re = value.re, im = value.im, "simulated circuit sample");
        Ok(Sample {
            value,
            cost: depth as f64,
            max_time: t,
        })
    }
}
