use std::collections::BTreeMap;

use chrono::Utc;
use qcels_core::errors::QcelsError;
use qcels_core::{RunProvenance, SchemaVersion, SpectralModel};
use serde::{Deserialize, Serialize};

use crate::config::RunSpec;
use crate::hash::{round_f64, stable_hash_string};
use crate::large::{CostLedger, QcelsEstimate};
use crate::qpe::QpeEstimate;
use crate::small::SmallOverlapEstimate;

/// Schema of [`EstimationReport`].
pub const REPORT_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Estimator-specific payload of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum RunOutcome {
    /// Multi-level QCELS on raw samples.
    LargeOverlap(QcelsEstimate),
    /// Rough estimate plus filtered multi-level QCELS.
    SmallOverlap(SmallOverlapEstimate),
    /// QPE baseline.
    Qpe(QpeEstimate),
}

impl RunOutcome {
    /// Estimated ground energy.
    pub fn ground_energy(&self) -> f64 {
        match self {
            RunOutcome::LargeOverlap(estimate) => estimate.ground_energy,
            RunOutcome::SmallOverlap(estimate) => estimate.estimate.ground_energy,
            RunOutcome::Qpe(estimate) => estimate.ground_energy,
        }
    }

    /// Total cost of the run.
    pub fn cost(&self) -> CostLedger {
        match self {
            RunOutcome::LargeOverlap(estimate) => estimate.cost,
            RunOutcome::SmallOverlap(estimate) => estimate.cost,
            RunOutcome::Qpe(estimate) => estimate.cost,
        }
    }

    fn level_energies(&self) -> Vec<f64> {
        let levels = match self {
            RunOutcome::LargeOverlap(estimate) => &estimate.levels,
            RunOutcome::SmallOverlap(estimate) => &estimate.estimate.levels,
            RunOutcome::Qpe(_) => return Vec::new(),
        };
        levels.iter().map(|record| round_f64(record.params.lambda)).collect()
    }
}

/// Serialized result of one estimation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationReport {
    /// Report schema.
    pub schema_version: SchemaVersion,
    /// Hashes, seed and tool versions.
    pub provenance: RunProvenance,
    /// Estimator output.
    pub outcome: RunOutcome,
    /// Spectrum entry 0 of the model.
    pub reference_energy: f64,
    /// `|λ̂ − reference_energy|`.
    pub abs_error: f64,
    /// Hash over everything above except `created_at`.
    pub report_hash: String,
}

impl EstimationReport {
    /// Estimated ground energy.
    pub fn ground_energy(&self) -> f64 {
        self.outcome.ground_energy()
    }
}

fn tool_versions() -> BTreeMap<String, String> {
    let mut versions = BTreeMap::new();
    versions.insert("qcels-est".to_string(), env!("CARGO_PKG_VERSION").to_string());
    versions
}

/// Hash of the reproducible part of a report; `created_at` is left out.
pub fn report_hash(
    provenance: &RunProvenance,
    outcome: &RunOutcome,
    reference_energy: f64,
) -> Result<String, QcelsError> {
    let cost = outcome.cost();
    stable_hash_string(&(
        &provenance.config_hash,
        &provenance.model_hash,
        &provenance.sampler,
        provenance.seed,
        round_f64(outcome.ground_energy()),
        round_f64(cost.total_time),
        round_f64(cost.max_time),
        outcome.level_energies(),
        round_f64(reference_energy),
    ))
}

/// Assembles the report for a finished run.
pub fn build_report(
    spec: &RunSpec,
    model: &SpectralModel,
    sampler: &str,
    outcome: RunOutcome,
) -> Result<EstimationReport, QcelsError> {
    let provenance = RunProvenance {
        config_hash: stable_hash_string(spec)?,
        model_hash: stable_hash_string(model)?,
        sampler: sampler.to_string(),
        seed: spec.seed_policy.master_seed,
        created_at: Utc::now().to_rfc3339(),
        tool_versions: tool_versions(),
    };
    let reference_energy = model.reference_energy();
    let report_hash = report_hash(&provenance, &outcome, reference_energy)?;
    Ok(EstimationReport {
        schema_version: REPORT_SCHEMA,
        abs_error: (outcome.ground_energy() - reference_energy).abs(),
        provenance,
        outcome,
        reference_energy,
        report_hash,
    })
}
