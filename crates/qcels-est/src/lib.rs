#![deny(missing_docs)]
#![doc = "Multi-level QCELS drivers, rough CDF estimation, the QPE baseline and run reports."]

/// YAML run configuration.
pub mod config;
/// Canonical hashing helpers.
pub mod hash;
/// Large-overlap driver, level loop and batch replay.
pub mod large;
/// QPE baseline.
pub mod qpe;
/// Rough CDF bisection.
pub mod rough;
/// Report assembly and hashing.
pub mod report;
/// End-to-end run entry point.
pub mod runner;
/// Doubling level schedule.
pub mod schedule;
/// Canonical JSON and YAML helpers.
pub mod serde;
/// Small-overlap driver.
pub mod small;
/// Driver state machine.
pub mod state;

pub use config::{
    EstimatorConfig, ModelSpec, QcelsConfig, QpeConfig, RunSpec, SeedPolicy, SmallOverlapConfig,
};
pub use large::{
    qcels_large_overlap, refine, refine_from_batches, CostLedger, LevelRecord, QcelsEstimate,
    SampleBatch,
};
pub use qpe::{qpe_estimate, QpeEstimate};
pub use report::{build_report, report_hash, EstimationReport, RunOutcome, REPORT_SCHEMA};
pub use rough::{
    bisect_cdf, estimate_ground_energy_rough, Bisection, RoughEstimate, RoughSearchOpts,
    DEFAULT_THRESHOLD_DIVISOR,
};
pub use runner::run;
pub use schedule::LevelSchedule;
pub use small::{qcels_small_overlap, SmallOverlapEstimate};
pub use state::DriverState;
