//! Empirical CDF estimation from Fourier-filtered Hadamard tests.
//!
//! Each draw picks an order `J` with probability `|F̂_J| / ‖F̂‖₁`, runs the two
//! Hadamard channels at evolution time `J + shift` and records the ±1
//! outcomes. Averaging `‖F̂‖₁ (X + iY) e^{i(arg F̂_J + Jx)}` gives an unbiased
//! estimate of `Σ_k p_k F(x − λ_k) e^{−iλ_k shift}`. With `shift = 0` its real
//! part is the smoothed spectral CDF.

use num_complex::Complex64;
use qcels_core::errors::{require_positive_count, ErrorInfo, QcelsError};
use qcels_core::{RngHandle, SpectralModel};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fourier::FourierFilter;

fn cdf_error(code: &str, message: impl Into<String>) -> QcelsError {
    QcelsError::InvalidArgument(ErrorInfo::new(code, message))
}

/// Draws `count` indices from an unnormalised discrete distribution by CDF inversion.
pub fn draw_with_prob(
    distribution: &[f64],
    count: usize,
    rng: &mut RngHandle,
) -> Result<Vec<usize>, QcelsError> {
    if distribution.is_empty() {
        return Err(cdf_error(
            "empty-distribution",
            "distribution must have at least one entry",
        ));
    }
    if let Some(idx) = distribution
        .iter()
        .position(|w| !w.is_finite() || *w < 0.0)
    {
        return Err(QcelsError::InvalidArgument(
            ErrorInfo::new(
                "invalid-weight",
                "distribution weights must be finite and nonnegative",
            )
            .with_context("index", idx),
        ));
    }
    let total: f64 = distribution.iter().sum();
    if total <= 0.0 {
        return Err(cdf_error(
            "zero-mass",
            "distribution must carry positive total weight",
        ));
    }
    let mut running = 0.0;
    let cumulative: Vec<f64> = distribution
        .iter()
        .map(|w| {
            running += w / total;
            running
        })
        .collect();
    let last = cumulative.len() - 1;
    Ok((0..count)
        .map(|_| {
            let u = rng.uniform();
            cumulative.partition_point(|c| *c <= u).min(last)
        })
        .collect())
}

/// Raw Hadamard-test outcomes of a filtered sampling batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdfSamples {
    /// Filter order `J` of every draw.
    pub orders: Vec<i64>,
    /// Real-channel outcomes (±1).
    pub outcome_x: Vec<f64>,
    /// Imaginary-channel outcomes (±1).
    pub outcome_y: Vec<f64>,
    /// Evolution time added to every Hadamard test.
    pub time_shift: f64,
    /// Draws per batch.
    pub nsample: usize,
    /// Number of batches.
    pub nbatch: usize,
}

impl CdfSamples {
    /// Number of recorded draws.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// True when no draw was recorded.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// `Σ |J|` over all draws, the evolution time spent on the filter.
    pub fn total_evolution_time(&self) -> f64 {
        self.orders.iter().map(|j| j.unsigned_abs() as f64).sum()
    }

    /// Largest `|J|` over all draws.
    pub fn max_evolution_time(&self) -> f64 {
        self.orders
            .iter()
            .map(|j| j.unsigned_abs() as f64)
            .fold(0.0, f64::max)
    }

    /// Unbiased estimate of `Σ_k p_k F(x − λ_k) e^{−iλ_k shift}`.
    pub fn filtered_signal_at(&self, x: f64, filter: &FourierFilter) -> Complex64 {
        if self.is_empty() {
            return Complex64::default();
        }
        let norm = filter.l1_norm();
        let total: Complex64 = self
            .orders
            .iter()
            .zip(self.outcome_x.iter().zip(&self.outcome_y))
            .map(|(order, (re, im))| {
                let rotation = filter.phase(*order) + *order as f64 * x;
                Complex64::new(*re, *im) * Complex64::from_polar(1.0, rotation)
            })
            .sum();
        total * norm / self.len() as f64
    }

    /// Smoothed CDF estimate evaluated at every probe point.
    pub fn cdf_at(&self, probes: &[f64], filter: &FourierFilter) -> Vec<f64> {
        probes
            .iter()
            .map(|x| self.filtered_signal_at(*x, filter).re)
            .collect()
    }
}

fn channel_outcome(rng: &mut RngHandle, expectation: f64) -> f64 {
    if rng.uniform() < (1.0 + expectation) / 2.0 {
        1.0
    } else {
        -1.0
    }
}

/// Samples `nsample × nbatch` filtered Hadamard tests shifted by `time_shift`.
pub fn sample_xy(
    model: &SpectralModel,
    filter: &FourierFilter,
    nsample: usize,
    nbatch: usize,
    time_shift: f64,
    rng: &mut RngHandle,
) -> Result<CdfSamples, QcelsError> {
    require_positive_count("nsample", nsample)?;
    require_positive_count("nbatch", nbatch)?;
    if !time_shift.is_finite() {
        return Err(cdf_error("non-finite-time", "time shift must be finite"));
    }
    let draws = nsample * nbatch;
    let indices = draw_with_prob(&filter.sampling_weights(), draws, rng)?;
    let mut orders = Vec::with_capacity(draws);
    let mut outcome_x = Vec::with_capacity(draws);
    let mut outcome_y = Vec::with_capacity(draws);
    for idx in indices {
        let order = filter.order_at(idx);
        let z = model.signal(order as f64 + time_shift);
        outcome_x.push(channel_outcome(rng, z.re));
        outcome_y.push(channel_outcome(rng, z.im));
        orders.push(order);
    }
    debug!(draws, degree = filter.degree(), time_shift, "sampled filtered hadamard tests");
    Ok(CdfSamples {
        orders,
        outcome_x,
        outcome_y,
        time_shift,
        nsample,
        nbatch,
    })
}
