//! YAML-configurable run description.

use qcels_core::errors::{require_positive_count, require_positive_finite, ErrorInfo, QcelsError};
use qcels_core::{generate_spectrum_population, ModelConfig, SpectralModel};
use qcels_fit::FitOpts;
use qcels_sample::SamplerConfig;
use serde::{Deserialize, Serialize};

use crate::rough::RoughSearchOpts;
use crate::schedule::LevelSchedule;

fn config_error(code: &str, message: impl Into<String>) -> QcelsError {
    QcelsError::InvalidArgument(ErrorInfo::new(code, message.into()))
}

fn require_finite(name: &str, value: f64) -> Result<(), QcelsError> {
    if !value.is_finite() {
        return Err(QcelsError::InvalidArgument(
            ErrorInfo::new("non-finite-value", format!("{name} must be finite"))
                .with_context("parameter", name),
        ));
    }
    Ok(())
}

fn default_time_steps() -> usize {
    5
}

fn default_nsample() -> usize {
    100
}

fn default_nbatch() -> usize {
    1
}

fn default_initial_amplitude() -> f64 {
    0.5
}

/// Large-overlap driver parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QcelsConfig {
    /// Maximal depth `T` reached by the last level.
    pub total_time: f64,
    /// Samples per level `NT`.
    #[serde(default = "default_time_steps")]
    pub time_steps: usize,
    /// Shots per Hadamard channel for a sampler built from [`SamplerConfig`].
    ///
    /// Samplers injected directly into [`crate::qcels_large_overlap`] carry
    /// their own shot count and this field does not reach them.
    #[serde(default = "default_nsample")]
    pub nsample: usize,
    /// Prior guess of the ground energy used to start level 0.
    pub lambda_prior: f64,
    /// Real amplitude of the level-0 starting point.
    #[serde(default = "default_initial_amplitude")]
    pub initial_amplitude: f64,
    /// Fitter options used at every level.
    #[serde(default)]
    pub fit: FitOpts,
}

impl QcelsConfig {
    /// Convenience constructor with default fit options.
    pub fn new(total_time: f64, time_steps: usize, nsample: usize, lambda_prior: f64) -> Self {
        Self {
            total_time,
            time_steps,
            nsample,
            lambda_prior,
            initial_amplitude: default_initial_amplitude(),
            fit: FitOpts::default(),
        }
    }

    /// Checks every field and returns the level schedule.
    pub fn validate(&self) -> Result<LevelSchedule, QcelsError> {
        require_positive_count("nsample", self.nsample)?;
        require_finite("lambda_prior", self.lambda_prior)?;
        require_finite("initial_amplitude", self.initial_amplitude)?;
        LevelSchedule::new(self.total_time, self.time_steps)
    }
}

/// Small-overlap driver parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SmallOverlapConfig {
    /// Maximal depth `T` reached by the last level.
    pub total_time: f64,
    /// Samples per level `NT`.
    #[serde(default = "default_time_steps")]
    pub time_steps: usize,
    /// Degree `d` of the eigenvalue filter.
    pub degree: usize,
    /// Filter resolution and rough-search tolerance `δ`.
    pub delta: f64,
    /// Offset between the rough estimate and the filter center, doubled.
    pub rel_gap: f64,
    /// Draws used for the rough CDF and for level 0.
    pub nsample_rough: usize,
    /// Draws per filtered estimate at levels `1..=L`.
    pub nsample: usize,
    /// Batches per filtered estimate.
    #[serde(default = "default_nbatch")]
    pub nbatch: usize,
    /// Real amplitude of the level-0 starting point.
    #[serde(default = "default_initial_amplitude")]
    pub initial_amplitude: f64,
    /// Rough CDF search tunables.
    #[serde(default)]
    pub rough: RoughSearchOpts,
    /// Fitter options used at every level.
    #[serde(default)]
    pub fit: FitOpts,
}

impl SmallOverlapConfig {
    /// Checks every field and returns the level schedule.
    pub fn validate(&self) -> Result<LevelSchedule, QcelsError> {
        require_positive_finite("delta", self.delta)?;
        require_positive_count("nsample_rough", self.nsample_rough)?;
        require_positive_count("nsample", self.nsample)?;
        require_positive_count("nbatch", self.nbatch)?;
        require_finite("rel_gap", self.rel_gap)?;
        require_finite("initial_amplitude", self.initial_amplitude)?;
        self.rough.validate()?;
        LevelSchedule::new(self.total_time, self.time_steps)
    }
}

/// QPE baseline parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QpeConfig {
    /// Circuit depth `T`; the register resolves `2T` grid points.
    pub depth: usize,
    /// Independent QPE runs; the minimum outcome is reported.
    pub tries: usize,
}

impl QpeConfig {
    /// Rejects zero depth or tries.
    pub fn validate(&self) -> Result<(), QcelsError> {
        require_positive_count("depth", self.depth)?;
        require_positive_count("tries", self.tries)
    }
}

/// Source of the spectral model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ModelSpec {
    /// Spectrum and population used verbatim.
    Explicit {
        /// Eigenvalues, index 0 is the reference ground energy.
        spectrum: Vec<f64>,
        /// Overlaps, summing to one.
        population: Vec<f64>,
    },
    /// Raw eigenenergies rescaled to `ham_shift`, with injected leading overlaps.
    Injected {
        /// Unscaled eigenenergies in ascending order.
        eigenenergies: Vec<f64>,
        /// Raw overlaps before injection.
        population: Vec<f64>,
        /// Overlaps forced onto the leading eigenvectors.
        #[serde(default)]
        dominant: Vec<f64>,
    },
}

impl ModelSpec {
    /// Materialises the model.
    pub fn build(&self, config: &ModelConfig) -> Result<SpectralModel, QcelsError> {
        match self {
            ModelSpec::Explicit {
                spectrum,
                population,
            } => SpectralModel::new(spectrum.clone(), population.clone()),
            ModelSpec::Injected {
                eigenenergies,
                population,
                dominant,
            } => generate_spectrum_population(eigenenergies, population, dominant, config),
        }
    }
}

/// Which estimator a run executes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum EstimatorConfig {
    /// Multi-level QCELS on raw Hadamard-test data.
    LargeOverlap(QcelsConfig),
    /// Rough CDF estimate followed by filtered multi-level QCELS.
    SmallOverlap(SmallOverlapConfig),
    /// Fejér-kernel QPE baseline.
    Qpe(QpeConfig),
}

impl EstimatorConfig {
    /// Stable label recorded in reports.
    pub fn label(&self) -> &'static str {
        match self {
            EstimatorConfig::LargeOverlap(_) => "large-overlap",
            EstimatorConfig::SmallOverlap(_) => "small-overlap",
            EstimatorConfig::Qpe(_) => "qpe",
        }
    }
}

/// Master seed policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeedPolicy {
    /// Seed from which every substream is derived.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
}

fn default_master_seed() -> u64 {
    0x0C3E_1500_5EED_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
        }
    }
}

/// Complete description of one estimation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSpec {
    /// Spectral model source.
    pub model: ModelSpec,
    /// Model preparation knobs.
    #[serde(default)]
    pub model_config: ModelConfig,
    /// Sampler used by the large-overlap driver.
    #[serde(default)]
    pub sampler: SamplerConfig,
    /// Estimator and its parameters.
    pub estimator: EstimatorConfig,
    /// Seeding policy.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
}

impl RunSpec {
    /// Validates the estimator parameters without sampling.
    pub fn validate(&self) -> Result<(), QcelsError> {
        match &self.estimator {
            EstimatorConfig::LargeOverlap(config) => config.validate().map(|_| ()),
            EstimatorConfig::SmallOverlap(config) => {
                if !matches!(self.sampler, SamplerConfig::Theory) {
                    return Err(config_error(
                        "unsupported-sampler",
                        "small-overlap runs sample the filtered estimator directly",
                    ));
                }
                config.validate().map(|_| ())
            }
            EstimatorConfig::Qpe(config) => config.validate(),
        }
    }
}
