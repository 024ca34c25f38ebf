//! Rough ground-energy estimate by bisecting an empirical CDF.
//!
//! Ten probes are spread over `[center − L, center + L)`; the first probe
//! whose CDF value exceeds `p₀ / threshold_divisor` becomes the new center and
//! `L` halves. The search stops once `L ≤ δ`, i.e. after `⌈log₂(L₀/δ)⌉` rounds.

use std::f64::consts::FRAC_PI_3;

use qcels_core::errors::{require_positive_count, require_positive_finite, ErrorInfo, QcelsError};
use qcels_core::{RngHandle, SpectralModel};
use qcels_filter::{sample_xy, FourierFilter};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::large::CostLedger;

/// Divisor applied to the reference overlap to form the CDF threshold.
///
/// Slightly above 2, so the threshold sits just under half the ground-state
/// jump of the CDF.
pub const DEFAULT_THRESHOLD_DIVISOR: f64 = 2.05;

fn default_threshold_divisor() -> f64 {
    DEFAULT_THRESHOLD_DIVISOR
}

fn default_probes() -> usize {
    10
}

fn default_initial_half_width() -> f64 {
    FRAC_PI_3
}

/// Tunables of the CDF bisection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoughSearchOpts {
    /// Threshold is `reference overlap / threshold_divisor`.
    #[serde(default = "default_threshold_divisor")]
    pub threshold_divisor: f64,
    /// Probes evaluated per round.
    #[serde(default = "default_probes")]
    pub probes: usize,
    /// Half-width `L₀` of the first probe window.
    #[serde(default = "default_initial_half_width")]
    pub initial_half_width: f64,
}

impl Default for RoughSearchOpts {
    fn default() -> Self {
        Self {
            threshold_divisor: default_threshold_divisor(),
            probes: default_probes(),
            initial_half_width: default_initial_half_width(),
        }
    }
}

impl RoughSearchOpts {
    /// Rejects non-positive tunables.
    pub fn validate(&self) -> Result<(), QcelsError> {
        require_positive_finite("threshold_divisor", self.threshold_divisor)?;
        require_positive_count("probes", self.probes)?;
        require_positive_finite("initial_half_width", self.initial_half_width)
    }
}

/// Result of [`bisect_cdf`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bisection {
    /// Final center.
    pub center: f64,
    /// Half-width after the last halving, at most δ.
    pub half_width: f64,
    /// Rounds performed.
    pub iterations: usize,
}

/// Bisects any CDF evaluator down to resolution `delta`, starting at 0.
pub fn bisect_cdf<F>(
    mut cdf: F,
    threshold: f64,
    delta: f64,
    opts: &RoughSearchOpts,
) -> Result<Bisection, QcelsError>
where
    F: FnMut(&[f64]) -> Vec<f64>,
{
    require_positive_finite("delta", delta)?;
    opts.validate()?;
    if !threshold.is_finite() {
        return Err(QcelsError::InvalidArgument(
            ErrorInfo::new("non-finite-threshold", "cdf threshold must be finite")
                .with_context("threshold", threshold),
        ));
    }
    let count = opts.probes as f64;
    let mut center = 0.0;
    let mut half_width = opts.initial_half_width;
    let mut iterations = 0;
    while half_width > delta {
        let probes: Vec<f64> = (0..opts.probes)
            .map(|i| (2.0 * i as f64 / count - 1.0) * half_width + center)
            .collect();
        let values = cdf(&probes);
        let crossing = values.iter().position(|value| *value > threshold);
        let Some(index) = crossing else {
            return Err(QcelsError::Estimation(
                ErrorInfo::new(
                    "cdf-threshold-not-crossed",
                    "no probe exceeded the cdf threshold",
                )
                .with_context("iteration", iterations)
                .with_context("center", center)
                .with_context("half_width", half_width)
                .with_context("threshold", threshold)
                .with_hint("increase the filter degree or the number of rough samples"),
            ));
        };
        center = probes[index];
        half_width /= 2.0;
        iterations += 1;
        debug!(iteration = iterations, center, half_width, "cdf bisection round");
    }
    Ok(Bisection {
        center,
        half_width,
        iterations,
    })
}

/// Rough estimate and what it cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoughEstimate {
    /// Estimated ground energy, within about δ of the true value.
    pub ground_energy: f64,
    /// Bisection trace summary.
    pub bisection: Bisection,
    /// Evolution time charged for the estimate.
    pub cost: CostLedger,
}

/// Samples the filtered CDF once and bisects it.
///
/// Every round reuses the same samples but is charged their full evolution
/// time, so the total cost is `iterations · Σ|J|`.
pub fn estimate_ground_energy_rough(
    model: &SpectralModel,
    filter: &FourierFilter,
    nsample: usize,
    nbatch: usize,
    opts: &RoughSearchOpts,
    rng: &mut RngHandle,
) -> Result<RoughEstimate, QcelsError> {
    let samples = sample_xy(model, filter, nsample, nbatch, 0.0, rng)?;
    let threshold = model.reference_overlap() / opts.threshold_divisor;
    let bisection = bisect_cdf(
        |probes| samples.cdf_at(probes, filter),
        threshold,
        filter.delta(),
        opts,
    )?;
    let mut cost = CostLedger::default();
    cost.add(
        bisection.iterations as f64 * samples.total_evolution_time(),
        samples.max_evolution_time(),
    );
    info!(
        ground_energy = bisection.center,
        iterations = bisection.iterations,
        total_time = cost.total_time,
        "rough cdf estimate finished"
    );
    Ok(RoughEstimate {
        ground_energy: bisection.center,
        bisection,
        cost,
    })
}
