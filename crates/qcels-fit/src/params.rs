//! Parameter, bound and option types of the QCELS fit.

use num_complex::Complex64;
use qcels_core::errors::{ErrorInfo, QcelsError};
use serde::{Deserialize, Serialize};

fn default_max_iters() -> usize {
    200
}

fn default_tolerance() -> f64 {
    1e-14
}

fn default_initial_damping() -> f64 {
    1e-3
}

/// Model parameters `(a, b, λ)` of `(a + ib)·exp(−iλt)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitParams {
    /// Real part `a` of the amplitude.
    pub amplitude_re: f64,
    /// Imaginary part `b` of the amplitude.
    pub amplitude_im: f64,
    /// Energy `λ`.
    pub lambda: f64,
}

impl FitParams {
    /// Creates a parameter triple.
    pub const fn new(amplitude_re: f64, amplitude_im: f64, lambda: f64) -> Self {
        Self {
            amplitude_re,
            amplitude_im,
            lambda,
        }
    }

    /// Complex amplitude `a + ib`.
    pub fn amplitude(&self) -> Complex64 {
        Complex64::new(self.amplitude_re, self.amplitude_im)
    }

    /// Estimated overlap `|a + ib|`.
    pub fn overlap(&self) -> f64 {
        self.amplitude().norm()
    }

    /// Model value at time `t`.
    pub fn model_at(&self, t: f64) -> Complex64 {
        self.amplitude() * Complex64::from_polar(1.0, -self.lambda * t)
    }

    pub(crate) fn to_array(self) -> [f64; 3] {
        [self.amplitude_re, self.amplitude_im, self.lambda]
    }

    pub(crate) fn from_array(values: [f64; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

/// Box constraints on `(a, b, λ)`; infinite entries leave a side open.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitBounds {
    /// Lower bounds in `(a, b, λ)` order.
    pub lower: [f64; 3],
    /// Upper bounds in `(a, b, λ)` order.
    pub upper: [f64; 3],
}

impl FitBounds {
    /// Free amplitudes with `λ ∈ [center − half_width, center + half_width]`.
    pub fn lambda_window(center: f64, half_width: f64) -> Self {
        Self {
            lower: [f64::NEG_INFINITY, f64::NEG_INFINITY, center - half_width],
            upper: [f64::INFINITY, f64::INFINITY, center + half_width],
        }
    }

    /// Box with every side open.
    pub fn unbounded() -> Self {
        Self {
            lower: [f64::NEG_INFINITY; 3],
            upper: [f64::INFINITY; 3],
        }
    }

    /// Lower and upper bound on `λ`.
    pub fn lambda_range(&self) -> (f64, f64) {
        (self.lower[2], self.upper[2])
    }

    /// Projects `params` onto the box.
    pub fn project(&self, params: FitParams) -> FitParams {
        let mut values = params.to_array();
        for (idx, value) in values.iter_mut().enumerate() {
            *value = value.max(self.lower[idx]).min(self.upper[idx]);
        }
        FitParams::from_array(values)
    }

    pub(crate) fn validate(&self) -> Result<(), QcelsError> {
        for idx in 0..3 {
            let (lo, hi) = (self.lower[idx], self.upper[idx]);
            if lo.is_nan() || hi.is_nan() || lo > hi || lo == f64::INFINITY || hi == f64::NEG_INFINITY {
                return Err(QcelsError::InvalidArgument(
                    ErrorInfo::new("invalid-bounds", "fit bounds must satisfy lower <= upper")
                        .with_context("index", idx)
                        .with_context("lower", lo)
                        .with_context("upper", hi),
                ));
            }
        }
        Ok(())
    }
}

/// Solver options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FitOpts {
    /// Maximum accepted or rejected Levenberg–Marquardt steps.
    #[serde(default = "default_max_iters")]
    pub max_iters: usize,
    /// Relative objective decrease (and step size) below which the fit stops.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Starting Marquardt damping.
    #[serde(default = "default_initial_damping")]
    pub initial_damping: f64,
}

impl Default for FitOpts {
    fn default() -> Self {
        Self {
            max_iters: default_max_iters(),
            tolerance: default_tolerance(),
            initial_damping: default_initial_damping(),
        }
    }
}

/// Best iterate found by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitOutcome {
    /// Fitted parameters.
    pub params: FitParams,
    /// Objective value at `params`.
    pub residual: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether a stopping criterion fired before the iteration budget ran out.
    pub converged: bool,
}

impl FitOutcome {
    /// Turns a non-converged outcome into [`QcelsError::NumericalNonConvergence`].
    pub fn ensure_converged(self) -> Result<Self, QcelsError> {
        if self.converged {
            return Ok(self);
        }
        Err(QcelsError::NumericalNonConvergence(
            ErrorInfo::new("fit-not-converged", "fit exhausted its iteration budget")
                .with_context("iterations", self.iterations)
                .with_context("residual", self.residual)
                .with_hint("increase max_iters or loosen the tolerance"),
        ))
    }
}
