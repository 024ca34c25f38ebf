use qcels_est::serde::{from_json_slice, from_yaml_str, to_canonical_json_bytes};
use qcels_est::{run, EstimationReport, RunOutcome, RunSpec};

const LARGE_OVERLAP: &str = r#"
model:
  type: injected
  eigenenergies: [-4.0, -1.0, 0.5, 2.0]
  population: [0.5, 0.2, 0.2, 0.1]
  dominant: [0.8]
sampler:
  type: theory
estimator:
  mode: large-overlap
  total_time: 40.0
  time_steps: 5
  nsample: 200
  lambda_prior: -0.78
seed_policy:
  master_seed: 11
"#;

const QPE: &str = r#"
model:
  type: explicit
  spectrum: [-0.5, 0.3]
  population: [0.7, 0.3]
estimator:
  mode: qpe
  depth: 40
  tries: 12
"#;

#[test]
fn yaml_spec_fills_defaults() {
    let spec: RunSpec = from_yaml_str(LARGE_OVERLAP).unwrap();
    spec.validate().unwrap();
    let qpe: RunSpec = from_yaml_str(QPE).unwrap();
    assert_eq!(qpe.estimator.label(), "qpe");
}

#[test]
fn same_seed_same_report_hash() {
    let spec: RunSpec = from_yaml_str(LARGE_OVERLAP).unwrap();
    let first = run(&spec).unwrap();
    let second = run(&spec).unwrap();
    assert_eq!(first.report_hash, second.report_hash);
    assert_eq!(first.ground_energy(), second.ground_energy());
    assert_eq!(first.provenance.sampler, "theory");
    assert_eq!(first.provenance.seed, 11);
    assert!((first.reference_energy + std::f64::consts::FRAC_PI_4).abs() < 1e-12);
    assert!(first.abs_error < 0.1);
    assert!(matches!(first.outcome, RunOutcome::LargeOverlap(_)));
}

#[test]
fn different_seed_changes_the_hash() {
    let spec: RunSpec = from_yaml_str(LARGE_OVERLAP).unwrap();
    let mut other = spec.clone();
    other.seed_policy.master_seed = 12;
    assert_ne!(run(&spec).unwrap().report_hash, run(&other).unwrap().report_hash);
}

#[test]
fn report_survives_json_round_trip() {
    let spec: RunSpec = from_yaml_str(QPE).unwrap();
    let report = run(&spec).unwrap();
    let bytes = to_canonical_json_bytes(&report).unwrap();
    let restored: EstimationReport = from_json_slice(&bytes).unwrap();
    assert_eq!(restored.report_hash, report.report_hash);
    assert_eq!(restored.provenance, report.provenance);
    assert!((restored.ground_energy() - report.ground_energy()).abs() < 1e-12);
    assert!(matches!(restored.outcome, RunOutcome::Qpe(_)));
}

#[test]
fn small_overlap_requires_theory_sampler() {
    let yaml = r#"
model:
  type: explicit
  spectrum: [-0.5, 0.3]
  population: [0.3, 0.7]
sampler:
  type: simulated-circuit
estimator:
  mode: small-overlap
  total_time: 10.0
  degree: 20
  delta: 0.1
  rel_gap: 0.4
  nsample_rough: 100
  nsample: 100
"#;
    let spec: RunSpec = from_yaml_str(yaml).unwrap();
    let err = run(&spec).unwrap_err();
    assert_eq!(err.info().code, "unsupported-sampler");
}

#[test]
fn malformed_yaml_is_a_serde_error() {
    let err = from_yaml_str::<RunSpec>("model: [").unwrap_err();
    assert_eq!(err.info().code, "yaml-read");
}
