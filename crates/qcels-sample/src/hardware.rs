//! Adapter over an external shot backend (simulator service or device).

use qcels_core::errors::{require_positive_count, ErrorInfo, QcelsError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{phase_only_estimate, validate_time, Sample, Sampler, SamplerKind};

/// Ancilla-zero counts of one real/imaginary Hadamard-test pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HadamardCounts {
    /// Shots executed per circuit.
    pub shots: usize,
    /// Times the real-channel ancilla read 0.
    pub re_zeros: usize,
    /// Times the imaginary-channel ancilla read 0.
    pub im_zeros: usize,
}

/// External executor of Hadamard-test circuit pairs.
///
/// Circuit construction, transpilation and submission live behind this
/// trait; the estimator only sees counts.
pub trait ShotBackend {
    /// Backend name recorded in logs.
    fn name(&self) -> &str;

    /// Runs the real and imaginary circuits at time `t` with `shots` shots each.
    fn run_hadamard_pair(&mut self, t: f64, shots: usize) -> Result<HadamardCounts, QcelsError>;
}

/// [`Sampler`] forwarding to a [`ShotBackend`].
#[derive(Debug)]
pub struct HardwareSampler<B> {
    backend: B,
    nsample: usize,
}

impl<B: ShotBackend> HardwareSampler<B> {
    /// Wraps `backend`, rejecting `nsample = 0` up front.
    pub fn new(backend: B, nsample: usize) -> Result<Self, QcelsError> {
        require_positive_count("nsample", nsample)?;
        Ok(Self { backend, nsample })
    }

    /// Borrows the wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn check_counts(&self, counts: &HadamardCounts) -> Result<(), QcelsError> {
        if counts.shots != self.nsample
            || counts.re_zeros > counts.shots
            || counts.im_zeros > counts.shots
        {
            warn!(backend = self.backend.name(), ?counts, "malformed hadamard counts");
            return Err(QcelsError::SamplingFailure(
                ErrorInfo::new("malformed-counts", "backend returned inconsistent counts")
                    .with_context("backend", self.backend.name())
                    .with_context("requested_shots", self.nsample)
                    .with_context("shots", counts.shots)
                    .with_context("re_zeros", counts.re_zeros)
                    .with_context("im_zeros", counts.im_zeros),
            ));
        }
        Ok(())
    }
}

impl<B: ShotBackend> Sampler for HardwareSampler<B> {
    fn kind(&self) -> SamplerKind {
        SamplerKind::Hardware
    }

    fn sample(&mut self, t: f64) -> Result<Sample, QcelsError> {
        validate_time(t)?;
        let counts = self.backend.run_hadamard_pair(t, self.nsample)?;
        self.check_counts(&counts)?;
        let shots = counts.shots as f64;
        let re = 2.0 * counts.re_zeros as f64 / shots - 1.0;
        let im = 2.0 * counts.im_zeros as f64 / shots - 1.0;
        let value = phase_only_estimate(re, im);
        debug!(backend = self.backend.name(), t, re, im, "hardware sample");
        Ok(Sample {
            value,
            cost: t * shots,
            max_time: t,
        })
    }
}
