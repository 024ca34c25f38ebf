//! Spectral model shared read-only by every sampler within a run.

use std::f64::consts::FRAC_PI_4;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, QcelsError};

/// Absolute tolerance on `Σ population = 1`.
pub const POPULATION_TOLERANCE: f64 = 1e-8;

fn model_error(code: &str, message: impl Into<String>) -> QcelsError {
    QcelsError::InvalidArgument(ErrorInfo::new(code, message))
}

fn default_ham_shift() -> f64 {
    FRAC_PI_4
}

/// Normalisation constants applied when building a model from raw data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// Magnitude assigned to the largest-magnitude eigenvalue.
    #[serde(default = "default_ham_shift")]
    pub ham_shift: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            ham_shift: default_ham_shift(),
        }
    }
}

/// Eigenvalues of the Hamiltonian and squared overlaps of the initial state.
///
/// Index 0 is treated as the reference eigenvalue when reporting errors; the
/// estimator itself never assumes sorted order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawSpectralModel")]
pub struct SpectralModel {
    spectrum: Vec<f64>,
    population: Vec<f64>,
}

/// Unchecked wire form; decoding goes through [`SpectralModel::new`].
#[derive(Deserialize)]
struct RawSpectralModel {
    spectrum: Vec<f64>,
    population: Vec<f64>,
}

impl TryFrom<RawSpectralModel> for SpectralModel {
    type Error = QcelsError;

    fn try_from(raw: RawSpectralModel) -> Result<Self, Self::Error> {
        SpectralModel::new(raw.spectrum, raw.population)
    }
}

impl SpectralModel {
    /// Validates and wraps a spectrum/population pair.
    pub fn new(spectrum: Vec<f64>, population: Vec<f64>) -> Result<Self, QcelsError> {
        if spectrum.is_empty() {
            return Err(model_error("empty-spectrum", "spectrum must not be empty"));
        }
        if spectrum.len() != population.len() {
            return Err(QcelsError::InvalidArgument(
                ErrorInfo::new(
                    "length-mismatch",
                    "spectrum and population must have the same length",
                )
                .with_context("spectrum", spectrum.len())
                .with_context("population", population.len()),
            ));
        }
        if spectrum.iter().any(|value| !value.is_finite()) {
            return Err(model_error(
                "non-finite-spectrum",
                "spectrum entries must be finite",
            ));
        }
        if let Some(idx) = population
            .iter()
            .position(|p| !p.is_finite() || *p < 0.0)
        {
            return Err(QcelsError::InvalidArgument(
                ErrorInfo::new(
                    "negative-population",
                    "population entries must be finite and nonnegative",
                )
                .with_context("index", idx),
            ));
        }
        let total: f64 = population.iter().sum();
        if (total - 1.0).abs() > POPULATION_TOLERANCE {
            return Err(QcelsError::InvalidArgument(
                ErrorInfo::new("population-not-normalised", "population must sum to 1")
                    .with_context("sum", total)
                    .with_hint("renormalise with generate_spectrum_population"),
            ));
        }
        Ok(Self {
            spectrum,
            population,
        })
    }

    /// Eigenvalues in caller order.
    pub fn spectrum(&self) -> &[f64] {
        &self.spectrum
    }

    /// Squared overlaps in caller order.
    pub fn population(&self) -> &[f64] {
        &self.population
    }

    /// Number of eigenpairs in the model.
    pub fn len(&self) -> usize {
        self.spectrum.len()
    }

    /// Always false for a validated model.
    pub fn is_empty(&self) -> bool {
        self.spectrum.is_empty()
    }

    /// Reference (ground-state) eigenvalue, `spectrum[0]`.
    pub fn reference_energy(&self) -> f64 {
        self.spectrum[0]
    }

    /// Overlap of the initial state with the reference eigenvector.
    pub fn reference_overlap(&self) -> f64 {
        self.population[0]
    }

    /// Exact `Σ_k p_k exp(−i λ_k t)`.
    pub fn signal(&self, t: f64) -> Complex64 {
        self.spectrum
            .iter()
            .zip(&self.population)
            .map(|(lambda, p)| Complex64::from_polar(*p, -lambda * t))
            .sum()
    }

    /// Exact CDF `Σ_{λ_k ≤ x} p_k` of the spectral measure.
    pub fn cdf(&self, x: f64) -> f64 {
        self.spectrum
            .iter()
            .zip(&self.population)
            .filter(|(lambda, _)| **lambda <= x)
            .map(|(_, p)| *p)
            .sum()
    }
}

/// Normalises raw eigenenergies and injects dominant overlaps.
///
/// The spectrum is rescaled so the largest-magnitude eigenvalue equals
/// `config.ham_shift`. The first `dominant.len()` population entries are
/// replaced by `dominant` scaled against the remaining mass, after which the
/// whole population is renormalised, so `population[k] / Σ = dominant[k]`
/// for the injected entries.
pub fn generate_spectrum_population(
    eigenenergies: &[f64],
    population: &[f64],
    dominant: &[f64],
    config: &ModelConfig,
) -> Result<SpectralModel, QcelsError> {
    if eigenenergies.len() != population.len() {
        return Err(QcelsError::InvalidArgument(
            ErrorInfo::new(
                "length-mismatch",
                "eigenenergies and population must have the same length",
            )
            .with_context("eigenenergies", eigenenergies.len())
            .with_context("population", population.len()),
        ));
    }
    if dominant.len() >= population.len() && !dominant.is_empty() {
        return Err(model_error(
            "too-many-dominant",
            "at least one eigenpair must remain outside the injected overlaps",
        ));
    }
    if !config.ham_shift.is_finite() || config.ham_shift <= 0.0 {
        return Err(model_error(
            "invalid-ham-shift",
            "ham_shift must be positive and finite",
        ));
    }
    let scale = eigenenergies
        .iter()
        .fold(0.0_f64, |acc, value| acc.max(value.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return Err(model_error(
            "degenerate-spectrum",
            "eigenenergies must contain a finite nonzero entry",
        ));
    }
    let spectrum: Vec<f64> = eigenenergies
        .iter()
        .map(|value| value * config.ham_shift / scale)
        .collect();

    let injected: f64 = dominant.iter().sum();
    if dominant.iter().any(|p| !p.is_finite() || *p < 0.0) || injected >= 1.0 {
        return Err(QcelsError::InvalidArgument(
            ErrorInfo::new(
                "invalid-dominant-overlap",
                "dominant overlaps must be nonnegative and sum to less than 1",
            )
            .with_context("sum", injected),
        ));
    }
    let mut q = population.to_vec();
    let rest: f64 = q[dominant.len()..].iter().sum();
    if !dominant.is_empty() && rest <= 0.0 {
        return Err(model_error(
            "empty-remainder",
            "population outside the injected overlaps must carry weight",
        ));
    }
    for (slot, p) in q.iter_mut().zip(dominant) {
        *slot = p / (1.0 - injected) * rest;
    }
    let total: f64 = q.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return Err(model_error(
            "empty-population",
            "population must carry positive total weight",
        ));
    }
    for value in q.iter_mut() {
        *value /= total;
    }
    SpectralModel::new(spectrum, q)
}
