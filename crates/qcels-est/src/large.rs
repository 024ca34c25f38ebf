//! Multi-level QCELS for initial states with a large ground-state overlap.
//!
//! Every level collects `NT` samples on its grid, fits the single-exponential
//! model warm-started from the previous level and narrows the λ window to
//! `±π/(2τ)` around the new estimate. Level 0 is unconstrained.

use num_complex::Complex64;
use qcels_core::errors::{ErrorInfo, QcelsError};
use qcels_fit::{fit, FitBounds, FitOpts, FitOutcome, FitParams};
use qcels_sample::{Sample, Sampler};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::QcelsConfig;
use crate::schedule::LevelSchedule;
use crate::state::DriverState;

/// Relative slack allowed between stored batch times and `τ·j`.
const GRID_TOLERANCE: f64 = 1e-9;

fn driver_error(code: &str, message: impl Into<String>) -> QcelsError {
    QcelsError::InvalidArgument(ErrorInfo::new(code, message.into()))
}

/// Running evolution-time totals owned by a driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostLedger {
    /// Sum of per-sample costs.
    pub total_time: f64,
    /// Running maximum of per-sample max-times.
    pub max_time: f64,
}

impl CostLedger {
    /// Accounts for one sample.
    pub fn record(&mut self, sample: &Sample) {
        self.add(sample.cost, sample.max_time);
    }

    /// Accounts for a raw cost and max-time pair.
    pub fn add(&mut self, cost: f64, max_time: f64) {
        self.total_time += cost;
        self.max_time = self.max_time.max(max_time);
    }

    /// Folds another ledger into this one.
    pub fn absorb(&mut self, other: &CostLedger) {
        self.add(other.total_time, other.max_time);
    }
}

/// Samples collected for one level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleBatch {
    /// Level index.
    pub level: usize,
    /// Grid spacing τ.
    pub tau: f64,
    /// Evolution times `τ·j`.
    pub times: Vec<f64>,
    /// Estimates of the signal at `times`.
    pub observations: Vec<Complex64>,
    /// Cost of collecting the batch.
    #[serde(default)]
    pub cost: CostLedger,
}

impl SampleBatch {
    /// Collects one batch by querying `draw` at every grid time.
    pub fn collect<F>(schedule: &LevelSchedule, level: usize, mut draw: F) -> Result<Self, QcelsError>
    where
        F: FnMut(f64) -> Result<Sample, QcelsError>,
    {
        let times = schedule.times(level);
        let mut observations = Vec::with_capacity(times.len());
        let mut cost = CostLedger::default();
        for t in &times {
            let sample = draw(*t)?;
            cost.record(&sample);
            observations.push(sample.value);
        }
        Ok(Self {
            level,
            tau: schedule.spacing(level),
            times,
            observations,
            cost,
        })
    }
}

/// Outcome of one level fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelRecord {
    /// Level index.
    pub level: usize,
    /// Grid spacing τ.
    pub tau: f64,
    /// λ window imposed on the fit; `None` at level 0.
    pub window: Option<(f64, f64)>,
    /// Fitted parameters.
    pub params: FitParams,
    /// Objective at `params`.
    pub residual: f64,
    /// Fitter iterations.
    pub iterations: usize,
    /// Whether the fitter stopped on a convergence criterion.
    pub converged: bool,
    /// Cost of this level's samples.
    pub cost: CostLedger,
}

/// Final estimate of a multi-level run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QcelsEstimate {
    /// Estimated ground energy λ̂.
    pub ground_energy: f64,
    /// Parameters of the last level.
    pub params: FitParams,
    /// Residual of the last level.
    pub residual: f64,
    /// Accumulated cost of every level.
    pub cost: CostLedger,
    /// Per-level trace.
    pub levels: Vec<LevelRecord>,
}

/// Runs the level loop, asking `collect` for each level's batch.
///
/// `collect(level, schedule)` must return the batch of `level`; its
/// observations are fitted against the batch's own times.
pub fn refine<F>(
    schedule: &LevelSchedule,
    lambda_prior: f64,
    initial_amplitude: f64,
    opts: &FitOpts,
    mut collect: F,
) -> Result<QcelsEstimate, QcelsError>
where
    F: FnMut(usize, &LevelSchedule) -> Result<SampleBatch, QcelsError>,
{
    let mut state = DriverState::Preprocessing;
    let mut guess = FitParams::new(initial_amplitude, 0.0, lambda_prior);
    let mut window: Option<FitBounds> = None;
    let mut ledger = CostLedger::default();
    let mut levels = Vec::with_capacity(schedule.level_count());
    let mut last: Option<FitOutcome> = None;

    while let Some(level) = state.level() {
        let batch = collect(level, schedule)?;
        let outcome = fit(
            &batch.times,
            &batch.observations,
            guess,
            window.as_ref(),
            opts,
        )?;
        if !outcome.converged {
            warn!(level, iterations = outcome.iterations, "level fit hit the iteration cap");
        }
        ledger.absorb(&batch.cost);
        levels.push(LevelRecord {
            level,
            tau: batch.tau,
            window: window.map(|bounds| bounds.lambda_range()),
            params: outcome.params,
            residual: outcome.residual,
            iterations: outcome.iterations,
            converged: outcome.converged,
            cost: batch.cost,
        });
        debug!(
            level,
            lambda = outcome.params.lambda,
            residual = outcome.residual,
            total_time = ledger.total_time,
            "level fitted"
        );

        guess = outcome.params;
        // The next window is sized by the spacing of the level that produced λ.
        window = Some(FitBounds::lambda_window(
            outcome.params.lambda,
            std::f64::consts::PI / (2.0 * batch.tau),
        ));
        last = Some(outcome);
        state = state.advance(schedule.final_level());
    }

    let outcome = last.ok_or_else(|| {
        QcelsError::Estimation(ErrorInfo::new("no-levels", "schedule produced no levels"))
    })?;
    info!(
        ground_energy = outcome.params.lambda,
        levels = levels.len(),
        total_time = ledger.total_time,
        max_time = ledger.max_time,
        "qcels refinement finished"
    );
    Ok(QcelsEstimate {
        ground_energy: outcome.params.lambda,
        params: outcome.params,
        residual: outcome.residual,
        cost: ledger,
        levels,
    })
}

/// Multi-level QCELS driven by a live sampler.
///
/// The sampler's own shot count is used; `config.nsample` only applies when
/// [`crate::runner::run`] builds the sampler from a [`qcels_sample::SamplerConfig`].
pub fn qcels_large_overlap<S>(
    sampler: &mut S,
    config: &QcelsConfig,
) -> Result<QcelsEstimate, QcelsError>
where
    S: Sampler + ?Sized,
{
    let schedule = config.validate()?;
    info!(
        sampler = sampler.kind().label(),
        levels = schedule.level_count(),
        total_time = config.total_time,
        "starting large-overlap qcels"
    );
    refine(
        &schedule,
        config.lambda_prior,
        config.initial_amplitude,
        &config.fit,
        |level, schedule| SampleBatch::collect(schedule, level, |t| sampler.sample(t)),
    )
}

/// Replays the level fits over batches collected elsewhere.
///
/// The number of levels is `batches.len()`, so the schedule is rebuilt from
/// `total_time`, `time_steps` and that count rather than from `log₂(T/NT)`.
pub fn refine_from_batches(
    batches: &[SampleBatch],
    lambda_prior: f64,
    initial_amplitude: f64,
    opts: &FitOpts,
) -> Result<QcelsEstimate, QcelsError> {
    let first = batches
        .first()
        .ok_or_else(|| driver_error("empty-batches", "replay requires at least one batch"))?;
    let time_steps = first.times.len();
    for (index, batch) in batches.iter().enumerate() {
        if batch.level != index {
            return Err(QcelsError::InvalidArgument(
                ErrorInfo::new("batch-out-of-order", "batches must be ordered by level")
                    .with_context("index", index)
                    .with_context("level", batch.level),
            ));
        }
        if !(batch.tau.is_finite() && batch.tau > 0.0) {
            return Err(QcelsError::InvalidArgument(
                ErrorInfo::new("invalid-spacing", "batch spacing must be positive")
                    .with_context("level", batch.level)
                    .with_context("tau", batch.tau),
            ));
        }
        if let Some(step) = batch
            .times
            .iter()
            .enumerate()
            .position(|(j, t)| (t - batch.tau * j as f64).abs() > GRID_TOLERANCE * t.abs().max(1.0))
        {
            return Err(QcelsError::InvalidArgument(
                ErrorInfo::new("batch-grid-mismatch", "batch times must equal tau·j")
                    .with_context("level", batch.level)
                    .with_context("index", step)
                    .with_context("tau", batch.tau),
            ));
        }
        if batch.times.len() != time_steps || batch.observations.len() != time_steps {
            return Err(QcelsError::InvalidArgument(
                ErrorInfo::new(
                    "batch-length-mismatch",
                    "every batch must hold the same number of samples",
                )
                .with_context("level", batch.level)
                .with_context("expected", time_steps),
            ));
        }
    }
    let last = &batches[batches.len() - 1];
    let schedule = LevelSchedule::with_final_level(
        last.tau * time_steps as f64,
        time_steps,
        batches.len() - 1,
    )?;
    refine(&schedule, lambda_prior, initial_amplitude, opts, |level, _| {
        Ok(batches[level].clone())
    })
}
