#![deny(missing_docs)]
//! Sampling capabilities consumed by the QCELS drivers.
//!
//! Every backend implements [`Sampler`]: given an evolution time `t` it
//! returns a noisy estimate of `⟨ψ|e^{−itH}|ψ⟩` (or its filtered variant)
//! together with the evolution-time cost of producing it. The concrete
//! sampler is chosen once, from a [`SamplerConfig`] or in code, and injected
//! into the driver.

use num_complex::Complex64;
use qcels_core::errors::{ErrorInfo, QcelsError};
use serde::{Deserialize, Serialize};

pub mod circuit;
pub mod config;
pub mod filtered;
pub mod hardware;
pub mod theory;

pub use circuit::{CircuitCostModel, SimulatedCircuitSampler};
pub use config::{build_sampler, SamplerConfig};
pub use filtered::{sample_filtered, FilteredSampler};
pub use hardware::{HadamardCounts, HardwareSampler, ShotBackend};
pub use theory::{sample_unfiltered, TheorySampler};

/// One noisy Hadamard-test estimate and its cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Estimated complex expectation value.
    pub value: Complex64,
    /// Total evolution time (or depth proxy) spent on this estimate.
    pub cost: f64,
    /// Longest single-circuit evolution time used for this estimate.
    pub max_time: f64,
}

/// Implementation family of a sampler, recorded in report provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SamplerKind {
    /// Closed-form probabilities with binomial shot noise.
    Theory,
    /// Exact circuit probabilities, phase-only reconstruction, depth cost.
    SimulatedCircuit,
    /// Counts returned by an external shot backend.
    Hardware,
    /// Fourier-filtered Hadamard tests.
    Filtered,
}

impl SamplerKind {
    /// Stable label used in provenance records.
    pub fn label(&self) -> &'static str {
        match self {
            SamplerKind::Theory => "theory",
            SamplerKind::SimulatedCircuit => "simulated-circuit",
            SamplerKind::Hardware => "hardware",
            SamplerKind::Filtered => "filtered",
        }
    }
}

/// Capability producing noisy estimates of the time-domain signal.
pub trait Sampler {
    /// Implementation family.
    fn kind(&self) -> SamplerKind;

    /// Estimates the signal at evolution time `t ≥ 0`.
    fn sample(&mut self, t: f64) -> Result<Sample, QcelsError>;
}

impl<S: Sampler + ?Sized> Sampler for Box<S> {
    fn kind(&self) -> SamplerKind {
        (**self).kind()
    }

    fn sample(&mut self, t: f64) -> Result<Sample, QcelsError> {
        (**self).sample(t)
    }
}

pub(crate) fn validate_time(t: f64) -> Result<(), QcelsError> {
    if !t.is_finite() || t < 0.0 {
        return Err(QcelsError::InvalidArgument(
            ErrorInfo::new("invalid-time", "evolution time must be finite and nonnegative")
                .with_context("t", t),
        ));
    }
    Ok(())
}

/// Rebuilds a unit-modulus estimate from the two Hadamard channels.
///
/// `re` fixes the angle through `arccos`; the sign of `im` selects the
/// half-plane. Circuit backends use this instead of the raw `re + i·im`.
pub fn phase_only_estimate(re: f64, im: f64) -> Complex64 {
    let angle = re.clamp(-1.0, 1.0).acos();
    let phase = if im < 0.0 {
        std::f64::consts::TAU - angle
    } else {
        angle
    };
    Complex64::from_polar(1.0, phase)
}
