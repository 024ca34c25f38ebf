//! Closed-form Hadamard test with binomial shot noise.

use num_complex::Complex64;
use qcels_core::errors::{require_positive_count, QcelsError};
use qcels_core::{RngHandle, SpectralModel};
use tracing::debug;

use crate::{validate_time, Sample, Sampler, SamplerKind};

/// Draws one estimate of `Σ_k p_k e^{−iλ_k t}` from two independent channels.
///
/// Each channel runs `nsample` shots; the real channel succeeds with
/// probability `(1 + Re z)/2`, the imaginary one with `(1 + Im z)/2`.
pub fn sample_unfiltered(
    model: &SpectralModel,
    t: f64,
    nsample: usize,
    rng: &mut RngHandle,
) -> Result<Sample, QcelsError> {
    require_positive_count("nsample", nsample)?;
    validate_time(t)?;
    let z = model.signal(t);
    let shots = nsample as f64;
    let re_hits = rng.binomial(nsample, (1.0 + z.re) / 2.0) as f64;
    let im_hits = rng.binomial(nsample, (1.0 + z.im) / 2.0) as f64;
    let value = Complex64::new(2.0 * re_hits / shots - 1.0, 2.0 * im_hits / shots - 1.0);
    debug!(t, re = value.re, im = value.im, "theory sample");
    Ok(Sample {
        value,
        cost: t * shots,
        max_time: t,
    })
}

/// [`Sampler`] over a fixed model with a private RNG stream.
#[derive(Debug, Clone)]
pub struct TheorySampler {
    model: SpectralModel,
    nsample: usize,
    rng: RngHandle,
}

impl TheorySampler {
    /// Creates the sampler, rejecting `nsample = 0` up front.
    pub fn new(model: SpectralModel, nsample: usize, rng: RngHandle) -> Result<Self, QcelsError> {
        require_positive_count("nsample", nsample)?;
        Ok(Self {
            model,
            nsample,
            rng,
        })
    }

    /// Shots per channel.
    pub fn nsample(&self) -> usize {
        self.nsample
    }
}

impl Sampler for TheorySampler {
    fn kind(&self) -> SamplerKind {
        SamplerKind::Theory
    }

    fn sample(&mut self, t: f64) -> Result<Sample, QcelsError> {
        sample_unfiltered(&self.model, t, self.nsample, &mut self.rng)
    }
}
