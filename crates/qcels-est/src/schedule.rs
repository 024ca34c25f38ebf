//! Doubling evolution-time schedule shared by both QCELS drivers.

use std::f64::consts::PI;

use qcels_core::errors::{require_positive_count, require_positive_finite, ErrorInfo, QcelsError};
use serde::{Deserialize, Serialize};

/// Grid spacing per level for a total depth `T` and `NT` samples per level.
///
/// With `L = ⌊log₂(T/NT)⌋`, level `ℓ` uses `τ_ℓ = T/NT / 2^(L−ℓ)`, so the
/// last level reaches `τ_L·NT ≈ T` and each level doubles the spacing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelSchedule {
    total_time: f64,
    time_steps: usize,
    final_level: usize,
}

impl LevelSchedule {
    /// Builds the schedule; requires `T/NT ≥ 1`.
    pub fn new(total_time: f64, time_steps: usize) -> Result<Self, QcelsError> {
        require_positive_finite("total_time", total_time)?;
        require_positive_count("time_steps", time_steps)?;
        let ratio = total_time / time_steps as f64;
        if ratio < 1.0 {
            return Err(QcelsError::InvalidArgument(
                ErrorInfo::new(
                    "time-budget-too-small",
                    "total_time must be at least time_steps",
                )
                .with_context("total_time", total_time)
                .with_context("time_steps", time_steps),
            ));
        }
        Ok(Self {
            total_time,
            time_steps,
            final_level: ratio.log2().floor() as usize,
        })
    }

    /// Builds a schedule with a prescribed number of levels.
    ///
    /// Used when replaying stored batches, whose level count is fixed by the
    /// data rather than by `log₂(T/NT)`.
    pub fn with_final_level(
        total_time: f64,
        time_steps: usize,
        final_level: usize,
    ) -> Result<Self, QcelsError> {
        require_positive_finite("total_time", total_time)?;
        require_positive_count("time_steps", time_steps)?;
        Ok(Self {
            total_time,
            time_steps,
            final_level,
        })
    }

    /// Total depth `T`.
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Samples per level `NT`.
    pub fn time_steps(&self) -> usize {
        self.time_steps
    }

    /// Index `L` of the last level.
    pub fn final_level(&self) -> usize {
        self.final_level
    }

    /// Number of levels, `L + 1`.
    pub fn level_count(&self) -> usize {
        self.final_level + 1
    }

    /// Grid spacing `τ` at `level`.
    pub fn spacing(&self, level: usize) -> f64 {
        let exponent = self.final_level as i32 - level as i32;
        self.total_time / self.time_steps as f64 / 2f64.powi(exponent)
    }

    /// Evolution times `τ·j` for `j = 0..NT`.
    pub fn times(&self, level: usize) -> Vec<f64> {
        let tau = self.spacing(level);
        (0..self.time_steps).map(|j| tau * j as f64).collect()
    }

    /// Half-width `π/(2τ)` of the λ window produced by a fit at `level`.
    pub fn half_width(&self, level: usize) -> f64 {
        PI / (2.0 * self.spacing(level))
    }
}
