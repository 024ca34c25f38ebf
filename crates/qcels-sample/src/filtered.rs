//! Estimates of `⟨ψ|F(x − H) e^{−itH}|ψ⟩` built from filtered Hadamard tests.

use std::sync::Arc;

use qcels_core::errors::{require_positive_count, ErrorInfo, QcelsError};
use qcels_core::{RngHandle, SpectralModel};
use qcels_filter::{sample_xy, FourierFilter};
use tracing::debug;

use crate::{validate_time, Sample, Sampler, SamplerKind};

/// Draws one filtered estimate at time `t` for a filter centred at `center`.
///
/// Cost adds the filter's own evolution time `Σ|J|` to `t · nsample · nbatch`.
pub fn sample_filtered(
    model: &SpectralModel,
    filter: &FourierFilter,
    center: f64,
    t: f64,
    nsample: usize,
    nbatch: usize,
    rng: &mut RngHandle,
) -> Result<Sample, QcelsError> {
    validate_time(t)?;
    let samples = sample_xy(model, filter, nsample, nbatch, t, rng)?;
    let value = samples.filtered_signal_at(center, filter);
    let cost = samples.total_evolution_time() + t * (nsample * nbatch) as f64;
    let max_time = samples.max_evolution_time() + t;
    debug!(t, center, re = value.re, im = value.im, "filtered sample");
    Ok(Sample {
        value,
        cost,
        max_time,
    })
}

/// [`Sampler`] for the small-overlap path.
#[derive(Debug, Clone)]
pub struct FilteredSampler {
    model: SpectralModel,
    filter: Arc<FourierFilter>,
    center: f64,
    nsample: usize,
    nbatch: usize,
    rng: RngHandle,
}

impl FilteredSampler {
    /// Creates the sampler; the filter is shared with the rough estimator.
    pub fn new(
        model: SpectralModel,
        filter: Arc<FourierFilter>,
        center: f64,
        nsample: usize,
        nbatch: usize,
        rng: RngHandle,
    ) -> Result<Self, QcelsError> {
        require_positive_count("nsample", nsample)?;
        require_positive_count("nbatch", nbatch)?;
        if !center.is_finite() {
            return Err(QcelsError::InvalidArgument(
                ErrorInfo::new("invalid-center", "filter center must be finite")
                    .with_context("center", center),
            ));
        }
        Ok(Self {
            model,
            filter,
            center,
            nsample,
            nbatch,
            rng,
        })
    }

    /// Center `x` of the eigenvalue filter.
    pub fn center(&self) -> f64 {
        self.center
    }

    /// Changes the per-batch draw count for subsequent samples.
    pub fn set_nsample(&mut self, nsample: usize) -> Result<(), QcelsError> {
        require_positive_count("nsample", nsample)?;
        self.nsample = nsample;
        Ok(())
    }
}

impl Sampler for FilteredSampler {
    fn kind(&self) -> SamplerKind {
        SamplerKind::Filtered
    }

    fn sample(&mut self, t: f64) -> Result<Sample, QcelsError> {
        sample_filtered(
            &self.model,
            &self.filter,
            self.center,
            t,
            self.nsample,
            self.nbatch,
            &mut self.rng,
        )
    }
}
