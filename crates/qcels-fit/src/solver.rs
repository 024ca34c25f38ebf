//! Projected Levenberg–Marquardt solver for the QCELS objective.
//!
//! The residual vector stacks the real and imaginary parts of
//! `(a + ib)·exp(−iλt_j) − Z_j`, so the 3×3 normal equations are assembled
//! directly from the analytic partial derivatives. Every trial step is
//! projected onto the bound box and accepted only when it lowers the
//! objective, which keeps the returned residual at or below the residual of
//! the projected initial guess.

use num_complex::Complex64;
use qcels_core::errors::{require_positive_count, ErrorInfo, QcelsError};
use tracing::debug;

use crate::params::{FitBounds, FitOpts, FitOutcome, FitParams};

const MAX_DAMPING: f64 = 1e16;
const MIN_DAMPING: f64 = 1e-15;
const DIAG_FLOOR: f64 = 1e-12;
const RESIDUAL_FLOOR: f64 = 1e-30;

fn fit_error(code: &str, message: impl Into<String>) -> QcelsError {
    QcelsError::InvalidArgument(ErrorInfo::new(code, message.into()))
}

/// Mean squared misfit `(1/N)·Σ_j |(a + ib)·exp(−iλt_j) − Z_j|²`.
///
/// Returns zero for empty input.
pub fn objective(params: &FitParams, times: &[f64], observations: &[Complex64]) -> f64 {
    if times.is_empty() {
        return 0.0;
    }
    let total: f64 = times
        .iter()
        .zip(observations)
        .map(|(t, z)| (params.model_at(*t) - z).norm_sqr())
        .sum();
    total / times.len() as f64
}

struct NormalEquations {
    jtj: [[f64; 3]; 3],
    jtr: [f64; 3],
}

impl NormalEquations {
    fn assemble(params: &FitParams, times: &[f64], observations: &[Complex64]) -> Self {
        let mut jtj = [[0.0; 3]; 3];
        let mut jtr = [0.0; 3];
        for (t, z) in times.iter().zip(observations) {
            let (sin, cos) = (params.lambda * t).sin_cos();
            let model = params.model_at(*t);
            let residual = model - z;
            // Rows for the real and imaginary residual of sample j.
            let rows = [
                ([cos, sin, t * model.im], residual.re),
                ([-sin, cos, -t * model.re], residual.im),
            ];
            for (row, r) in rows {
                for i in 0..3 {
                    jtr[i] += row[i] * r;
                    for k in 0..3 {
                        jtj[i][k] += row[i] * row[k];
                    }
                }
            }
        }
        Self { jtj, jtr }
    }

    /// Solves `(JᵀJ + μ·D)·δ = −Jᵀr` with Marquardt diagonal scaling.
    fn solve(&self, damping: f64) -> Option<[f64; 3]> {
        let max_diag = (0..3).map(|i| self.jtj[i][i]).fold(0.0, f64::max);
        let floor = DIAG_FLOOR * max_diag.max(1.0);
        let mut a = self.jtj;
        let mut b = [-self.jtr[0], -self.jtr[1], -self.jtr[2]];
        for (i, row) in a.iter_mut().enumerate() {
            row[i] += damping * row[i].max(floor);
        }
        solve3(a, &mut b)?;
        b.iter().all(|v| v.is_finite()).then_some(b)
    }
}

fn solve3(mut a: [[f64; 3]; 3], b: &mut [f64; 3]) -> Option<()> {
    for col in 0..3 {
        let pivot = (col..3).max_by(|x, y| a[*x][col].abs().total_cmp(&a[*y][col].abs()))?;
        if a[pivot][col].abs() < f64::MIN_POSITIVE {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..3 {
            let factor = a[row][col] / a[col][col];
            for k in col..3 {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }
    for row in (0..3).rev() {
        let tail: f64 = (row + 1..3).map(|k| a[row][k] * b[k]).sum();
        b[row] = (b[row] - tail) / a[row][row];
    }
    Some(())
}

fn validate(
    times: &[f64],
    observations: &[Complex64],
    initial: &FitParams,
    opts: &FitOpts,
) -> Result<(), QcelsError> {
    if times.is_empty() {
        return Err(fit_error("empty-input", "fit requires at least one sample"));
    }
    if times.len() != observations.len() {
        return Err(QcelsError::InvalidArgument(
            ErrorInfo::new("length-mismatch", "times and observations differ in length")
                .with_context("times", times.len())
                .with_context("observations", observations.len()),
        ));
    }
    if times.iter().any(|t| !t.is_finite())
        || observations.iter().any(|z| !z.re.is_finite() || !z.im.is_finite())
    {
        return Err(fit_error("non-finite-input", "fit input contains NaN or infinity"));
    }
    if !initial.is_finite() {
        return Err(fit_error("non-finite-guess", "initial guess must be finite"));
    }
    require_positive_count("max_iters", opts.max_iters)?;
    if !opts.tolerance.is_finite() || opts.tolerance < 0.0 {
        return Err(fit_error("invalid-tolerance", "tolerance must be finite and nonnegative"));
    }
    if !opts.initial_damping.is_finite() || opts.initial_damping <= 0.0 {
        return Err(fit_error("invalid-damping", "initial damping must be positive"));
    }
    Ok(())
}

/// Fits `(a + ib)·exp(−iλt)` to `observations` sampled at `times`.
///
/// The initial guess is projected onto `bounds` first. Running out of
/// iterations is reported through [`FitOutcome::converged`], not as an error.
pub fn fit(
    times: &[f64],
    observations: &[Complex64],
    initial: FitParams,
    bounds: Option<&FitBounds>,
    opts: &FitOpts,
) -> Result<FitOutcome, QcelsError> {
    validate(times, observations, &initial, opts)?;
    let bounds = bounds.copied().unwrap_or_else(FitBounds::unbounded);
    bounds.validate()?;

    let mut current = bounds.project(initial);
    let mut value = objective(&current, times, observations);
    let mut damping = opts.initial_damping;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < opts.max_iters {
        if value <= RESIDUAL_FLOOR {
            converged = true;
            break;
        }
        iterations += 1;
        let system = NormalEquations::assemble(&current, times, observations);
        let mut accepted = None;
        while damping <= MAX_DAMPING {
            if let Some(delta) = system.solve(damping) {
                let mut values = current.to_array();
                for (v, d) in values.iter_mut().zip(delta) {
                    *v += d;
                }
                let trial = bounds.project(FitParams::from_array(values));
                let trial_value = objective(&trial, times, observations);
                if trial_value.is_finite() && trial_value < value {
                    accepted = Some((trial, trial_value));
                    damping = (damping / 3.0).max(MIN_DAMPING);
                    break;
                }
            }
            damping *= 4.0;
        }
        // No damping produces descent: projected stationary point.
        let Some((trial, trial_value)) = accepted else {
            converged = true;
            break;
        };
        let decrease = value - trial_value;
        let step = current
            .to_array()
            .iter()
            .zip(trial.to_array())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        let scale = trial.to_array().iter().map(|v| v.abs()).fold(1.0, f64::max);
        current = trial;
        value = trial_value;
        if decrease <= opts.tolerance * (value + decrease) || step <= opts.tolerance * scale {
            converged = true;
            break;
        }
    }

    debug!(
        iterations,
        residual = value,
        lambda = current.lambda,
        converged,
        "qcels fit finished"
    );
    Ok(FitOutcome {
        params: current,
        residual: value,
        iterations,
        converged,
    })
}
