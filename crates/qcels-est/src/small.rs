//! Filtered multi-level QCELS for initial states with a small overlap.

use std::sync::Arc;

use qcels_core::errors::QcelsError;
use qcels_core::rng::substreams;
use qcels_core::{RngHandle, SpectralModel};
use qcels_filter::FourierFilter;
use qcels_sample::{FilteredSampler, Sampler};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SmallOverlapConfig;
use crate::large::{refine, CostLedger, QcelsEstimate, SampleBatch};
use crate::rough::{estimate_ground_energy_rough, RoughEstimate};

/// Outcome of the small-overlap pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmallOverlapEstimate {
    /// Rough CDF estimate used as prior and filter anchor.
    pub rough: RoughEstimate,
    /// Center `x` of the eigenvalue filter.
    pub filter_center: f64,
    /// Multi-level fit on filtered data.
    pub estimate: QcelsEstimate,
    /// Rough plus level costs.
    pub cost: CostLedger,
}

/// Rough estimate, then multi-level QCELS on `⟨ψ|F(x − H)e^{−itH}|ψ⟩`.
///
/// The rough CDF and the filtered level samples draw from separate
/// substreams of `master_seed`. Level 0 reuses `nsample_rough` draws per
/// estimate; later levels use `nsample`.
pub fn qcels_small_overlap(
    model: &SpectralModel,
    config: &SmallOverlapConfig,
    master_seed: u64,
) -> Result<SmallOverlapEstimate, QcelsError> {
    let schedule = config.validate()?;
    let filter = Arc::new(FourierFilter::new(config.degree, config.delta)?);
    info!(
        degree = config.degree,
        delta = config.delta,
        levels = schedule.level_count(),
        "starting small-overlap qcels"
    );

    let mut rough_rng = RngHandle::for_substream(master_seed, substreams::ROUGH_CDF);
    let rough = estimate_ground_energy_rough(
        model,
        &filter,
        config.nsample_rough,
        config.nbatch,
        &config.rough,
        &mut rough_rng,
    )?;

    let filter_center = rough.ground_energy + config.rel_gap / 2.0;
    let mut sampler = FilteredSampler::new(
        model.clone(),
        Arc::clone(&filter),
        filter_center,
        config.nsample_rough,
        config.nbatch,
        RngHandle::for_substream(master_seed, substreams::FILTERED_SAMPLES),
    )?;
    let estimate = refine(
        &schedule,
        rough.ground_energy,
        config.initial_amplitude,
        &config.fit,
        |level, schedule| {
            let draws = if level == 0 {
                config.nsample_rough
            } else {
                config.nsample
            };
            sampler.set_nsample(draws)?;
            SampleBatch::collect(schedule, level, |t| sampler.sample(t))
        },
    )?;

    let mut cost = rough.cost;
    cost.absorb(&estimate.cost);
    Ok(SmallOverlapEstimate {
        rough,
        filter_center,
        estimate,
        cost,
    })
}
