mod common;

use common::{single_level_model, three_level_model, ExactSampler, FlakySampler};
use num_complex::Complex64;
use qcels_core::errors::QcelsError;
use qcels_core::rng::substreams;
use qcels_core::RngHandle;
use qcels_est::{
    qcels_large_overlap, refine_from_batches, LevelSchedule, QcelsConfig, SampleBatch,
};
use qcels_sample::{Sampler, TheorySampler};

#[test]
fn noiseless_single_eigenvalue_is_recovered() {
    let mut sampler = ExactSampler::new(single_level_model(-0.7));
    let config = QcelsConfig::new(100.0, 5, 1, -0.6);
    let estimate = qcels_large_overlap(&mut sampler, &config).unwrap();
    assert!((estimate.ground_energy + 0.7).abs() < 1e-6);
    assert!((estimate.params.overlap() - 1.0).abs() < 1e-6);
    assert_eq!(estimate.levels.len(), 5);
    assert_eq!(sampler.calls, 25);
}

#[test]
fn level_zero_fit_on_exact_data_has_zero_residual() {
    let mut sampler = ExactSampler::new(single_level_model(-0.4));
    let config = QcelsConfig {
        initial_amplitude: 1.0,
        ..QcelsConfig::new(40.0, 5, 1, -0.4)
    };
    let estimate = qcels_large_overlap(&mut sampler, &config).unwrap();
    let first = &estimate.levels[0];
    assert!(first.window.is_none());
    assert!(first.residual < 1e-20);
    assert!((first.params.lambda + 0.4).abs() < 1e-9);
}

#[test]
fn windows_halve_and_contain_the_previous_estimate() {
    let mut sampler = ExactSampler::new(three_level_model());
    let estimate = qcels_large_overlap(&mut sampler, &QcelsConfig::new(100.0, 5, 1, -1.0)).unwrap();
    let widths: Vec<f64> = estimate
        .levels
        .iter()
        .filter_map(|record| record.window.map(|(lo, hi)| hi - lo))
        .collect();
    assert_eq!(widths.len(), 4);
    for pair in widths.windows(2) {
        assert!((pair[1] / pair[0] - 0.5).abs() < 1e-12);
    }
    for pair in estimate.levels.windows(2) {
        let (lo, hi) = pair[1].window.unwrap();
        let previous = pair[0].params.lambda;
        assert!((0.5 * (lo + hi) - previous).abs() < 1e-12);
        assert!(pair[1].params.lambda >= lo - 1e-12 && pair[1].params.lambda <= hi + 1e-12);
    }
}

#[test]
fn cost_ledger_sums_level_costs() {
    let mut sampler = ExactSampler::new(three_level_model());
    let estimate = qcels_large_overlap(&mut sampler, &QcelsConfig::new(100.0, 5, 1, -1.0)).unwrap();
    let mut running = 0.0;
    for record in &estimate.levels {
        let expected: f64 = (0..5).map(|j| record.tau * j as f64).sum();
        assert!((record.cost.total_time - expected).abs() < 1e-9);
        let before = running;
        running += record.cost.total_time;
        assert!(running >= before);
    }
    assert!((estimate.cost.total_time - running).abs() < 1e-9);
    assert!((estimate.cost.max_time - 80.0).abs() < 1e-12);
}

#[test]
fn three_level_scenario_succeeds_with_high_probability() {
    let model = three_level_model();
    let config = QcelsConfig::new(100.0, 5, 1000, -1.0);
    let trials = 20;
    let mut successes = 0;
    for seed in 0..trials {
        let rng = RngHandle::for_substream(seed, substreams::LEVEL_SAMPLES);
        let mut sampler = TheorySampler::new(model.clone(), 1000, rng).unwrap();
        let estimate = qcels_large_overlap(&mut sampler, &config).unwrap();
        if (estimate.ground_energy + 1.0).abs() < 0.05 {
            successes += 1;
        }
    }
    assert!(successes >= 18, "only {successes}/{trials} runs succeeded");
}

#[test]
fn identical_seeds_give_identical_estimates() {
    let model = three_level_model();
    let config = QcelsConfig::new(40.0, 5, 200, -0.9);
    let run = |seed| {
        let mut sampler = TheorySampler::new(model.clone(), 200, RngHandle::from_seed(seed)).unwrap();
        qcels_large_overlap(&mut sampler, &config).unwrap()
    };
    assert_eq!(run(7), run(7));
}

#[test]
fn invalid_config_fails_before_sampling() {
    let mut sampler = ExactSampler::new(single_level_model(0.1));
    let err = qcels_large_overlap(&mut sampler, &QcelsConfig::new(100.0, 5, 0, 0.0)).unwrap_err();
    assert!(err.is_invalid_argument());
    let err = qcels_large_overlap(&mut sampler, &QcelsConfig::new(3.0, 5, 10, 0.0)).unwrap_err();
    assert_eq!(err.info().code, "time-budget-too-small");
    assert_eq!(sampler.calls, 0);
}

#[test]
fn sampling_failures_propagate() {
    let mut sampler = FlakySampler {
        inner: ExactSampler::new(single_level_model(0.1)),
        fail_after: 7,
    };
    let err = qcels_large_overlap(&mut sampler, &QcelsConfig::new(100.0, 5, 1, 0.0)).unwrap_err();
    assert!(matches!(err, QcelsError::SamplingFailure(_)));
    assert_eq!(sampler.inner.calls, 7);
}

#[test]
fn replay_matches_live_run() {
    let model = three_level_model();
    let config = QcelsConfig::new(100.0, 5, 1, -1.0);
    let mut live = ExactSampler::new(model.clone());
    let expected = qcels_large_overlap(&mut live, &config).unwrap();

    let schedule = LevelSchedule::new(100.0, 5).unwrap();
    let mut sampler = ExactSampler::new(model);
    let batches: Vec<SampleBatch> = (0..schedule.level_count())
        .map(|level| SampleBatch::collect(&schedule, level, |t| sampler.sample(t)).unwrap())
        .collect();
    let replayed = refine_from_batches(&batches, -1.0, 0.5, &config.fit).unwrap();
    assert_eq!(replayed.levels.len(), expected.levels.len());
    assert!((replayed.ground_energy - expected.ground_energy).abs() < 1e-12);
    assert!((replayed.cost.total_time - expected.cost.total_time).abs() < 1e-9);
}

#[test]
fn replay_rejects_malformed_batches() {
    assert!(refine_from_batches(&[], 0.0, 0.5, &Default::default())
        .unwrap_err()
        .is_invalid_argument());
    let batch = |level, len: usize| SampleBatch {
        level,
        tau: 1.0,
        times: (0..len).map(|j| j as f64).collect(),
        observations: vec![Complex64::new(1.0, 0.0); len],
        cost: Default::default(),
    };
    let err = refine_from_batches(&[batch(1, 5)], 0.0, 0.5, &Default::default()).unwrap_err();
    assert_eq!(err.info().code, "batch-out-of-order");
    let err =
        refine_from_batches(&[batch(0, 5), batch(1, 4)], 0.0, 0.5, &Default::default()).unwrap_err();
    assert_eq!(err.info().code, "batch-length-mismatch");
}

#[test]
fn replay_rejects_times_off_the_tau_grid() {
    let times = vec![0.0, 1.0, 2.0, 3.0, 4.0];
    let batch = SampleBatch {
        level: 0,
        tau: 2.0,
        observations: times.iter().map(|t| Complex64::from_polar(1.0, 0.3 * t)).collect(),
        times,
        cost: Default::default(),
    };
    let err = refine_from_batches(&[batch], 0.0, 0.5, &Default::default()).unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(err.info().code, "batch-grid-mismatch");
    assert_eq!(err.info().context["index"], "1");
}

#[test]
fn injected_sampler_ignores_configured_shot_count() {
    let model = three_level_model();
    let mut first = ExactSampler::new(model.clone());
    let mut second = ExactSampler::new(model);
    let one_shot = qcels_large_overlap(&mut first, &QcelsConfig::new(80.0, 5, 1, -1.0)).unwrap();
    let many_shots =
        qcels_large_overlap(&mut second, &QcelsConfig::new(80.0, 5, 5000, -1.0)).unwrap();
    assert_eq!(one_shot, many_shots);
    assert_eq!(first.calls, second.calls);
}

#[test]
fn noiseless_error_shrinks_with_total_time() {
    let model = qcels_core::SpectralModel::new(vec![-0.5, 0.4], vec![0.99, 0.01]).unwrap();
    let errors: Vec<f64> = [40.0, 160.0, 640.0]
        .into_iter()
        .map(|total_time| {
            let mut sampler = ExactSampler::new(model.clone());
            let config = QcelsConfig::new(total_time, 5, 1, -0.45);
            let estimate = qcels_large_overlap(&mut sampler, &config).unwrap();
            let error = (estimate.ground_energy + 0.5).abs();
            assert!(error < 0.2 / total_time, "T = {total_time}: error {error}");
            error
        })
        .collect();
    assert!(errors[2] < errors[0], "errors {errors:?}");
}
