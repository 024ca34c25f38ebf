use qcels_core::errors::QcelsError;
use qcels_core::rng::substreams;
use qcels_core::RngHandle;
use qcels_sample::{build_sampler, Sampler, SamplerKind};
use tracing::info;

use crate::config::{EstimatorConfig, RunSpec};
use crate::large::qcels_large_overlap;
use crate::qpe::qpe_estimate;
use crate::report::{build_report, EstimationReport, RunOutcome};
use crate::small::qcels_small_overlap;

/// Builds the model and sampler described by `spec`, runs it and reports.
pub fn run(spec: &RunSpec) -> Result<EstimationReport, QcelsError> {
    spec.validate()?;
    let model = spec.model.build(&spec.model_config)?;
    let seed = spec.seed_policy.master_seed;
    info!(mode = spec.estimator.label(), seed, eigenpairs = model.len(), "run starting");

    let (sampler, outcome) = match &spec.estimator {
        EstimatorConfig::LargeOverlap(config) => {
            let rng = RngHandle::for_substream(seed, substreams::LEVEL_SAMPLES);
            let mut sampler = build_sampler(&spec.sampler, &model, config.nsample, rng)?;
            let estimate = qcels_large_overlap(sampler.as_mut(), config)?;
            (sampler.kind().label(), RunOutcome::LargeOverlap(estimate))
        }
        EstimatorConfig::SmallOverlap(config) => {
            let estimate = qcels_small_overlap(&model, config, seed)?;
            (SamplerKind::Filtered.label(), RunOutcome::SmallOverlap(estimate))
        }
        EstimatorConfig::Qpe(config) => {
            let mut rng = RngHandle::for_substream(seed, substreams::QPE);
            let estimate = qpe_estimate(&model, config, &mut rng)?;
            ("qpe", RunOutcome::Qpe(estimate))
        }
    };

    let report = build_report(spec, &model, sampler, outcome)?;
    info!(
        ground_energy = report.ground_energy(),
        abs_error = report.abs_error,
        report_hash = %report.report_hash,
        "run finished"
    );
    Ok(report)
}
