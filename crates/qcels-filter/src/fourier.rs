//! Bounded-degree trigonometric approximation of a smoothed Heaviside step.
//!
//! The target is the 2π-periodic step `H(x) = 1` on `[0, π)` and `0` on
//! `[−π, 0)`, convolved with a periodised Gaussian of width `σ = δ /
//! MOLLIFIER_WIDTHS`. The Fourier series of the convolution is
//!
//! ```text
//! F̂_0 = 1/2,   F̂_j = (1 − (−1)^j) / (2πij) · exp(−(σ j)² / 2),
//! ```
//!
//! truncated to `|j| ≤ d`. Evaluated at `x − λ` the filter is close to one
//! for eigenvalues `λ < x − δ` and close to zero for `λ > x + δ`.

use std::f64::consts::PI;

use num_complex::Complex64;
use qcels_core::errors::{require_positive_finite, QcelsError};
use serde::{Deserialize, Serialize};

/// Number of mollifier standard deviations that fit inside the resolution δ.
pub const MOLLIFIER_WIDTHS: f64 = 2.0;

/// Immutable Fourier filter coefficients `F̂_j` for `j ∈ [−d, d]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FourierFilter {
    degree: usize,
    delta: f64,
    coeffs: Vec<Complex64>,
}

impl FourierFilter {
    /// Builds the degree-`degree` filter at resolution `delta`.
    ///
    /// Degree zero yields the uniform filter `F ≡ 1/2`.
    pub fn new(degree: usize, delta: f64) -> Result<Self, QcelsError> {
        require_positive_finite("delta", delta)?;
        let sigma = delta / MOLLIFIER_WIDTHS;
        let d = degree as i64;
        let coeffs = (-d..=d)
            .map(|j| {
                if j == 0 {
                    Complex64::new(0.5, 0.0)
                } else if j % 2 == 0 {
                    Complex64::new(0.0, 0.0)
                } else {
                    let jf = j as f64;
                    let damping = (-(sigma * jf).powi(2) / 2.0).exp();
                    Complex64::new(0.0, -damping / (PI * jf))
                }
            })
            .collect();
        Ok(Self {
            degree,
            delta,
            coeffs,
        })
    }

    /// Polynomial degree `d`.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Resolution δ the filter was built for.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Coefficients ordered from `j = −d` to `j = d`.
    pub fn coefficients(&self) -> &[Complex64] {
        &self.coeffs
    }

    /// Coefficient `F̂_j`, zero outside `[−d, d]`.
    pub fn coefficient(&self, order: i64) -> Complex64 {
        self.index_of(order)
            .map(|idx| self.coeffs[idx])
            .unwrap_or_default()
    }

    /// Phase `arg F̂_j`.
    pub fn phase(&self, order: i64) -> f64 {
        self.coefficient(order).arg()
    }

    /// `‖F̂‖₁ = Σ_j |F̂_j|`.
    pub fn l1_norm(&self) -> f64 {
        self.coeffs.iter().map(|c| c.norm()).sum()
    }

    /// Sampling distribution `|F̂_j| / ‖F̂‖₁` aligned with [`Self::coefficients`].
    pub fn sampling_weights(&self) -> Vec<f64> {
        let norm = self.l1_norm();
        self.coeffs.iter().map(|c| c.norm() / norm).collect()
    }

    /// Maps an index into [`Self::coefficients`] back to its order `j`.
    pub fn order_at(&self, index: usize) -> i64 {
        index as i64 - self.degree as i64
    }

    /// Evaluates `F(x) = Re Σ_j F̂_j e^{ijx}`.
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coeffs
            .iter()
            .enumerate()
            .map(|(idx, c)| (c * Complex64::from_polar(1.0, self.order_at(idx) as f64 * x)).re)
            .sum()
    }

    fn index_of(&self, order: i64) -> Option<usize> {
        let d = self.degree as i64;
        if order.abs() > d {
            None
        } else {
            Some((order + d) as usize)
        }
    }
}
