use std::f64::consts::FRAC_PI_4;

use proptest::prelude::*;
use qcels_core::{generate_spectrum_population, ModelConfig, SpectralModel};

#[test]
fn rejects_mismatched_lengths() {
    let err = SpectralModel::new(vec![-1.0, 0.5], vec![1.0]).unwrap_err();
    assert_eq!(err.info().code, "length-mismatch");
}

#[test]
fn rejects_unnormalised_population() {
    let err = SpectralModel::new(vec![-1.0, 0.5], vec![0.5, 0.6]).unwrap_err();
    assert_eq!(err.info().code, "population-not-normalised");
}

#[test]
fn rejects_negative_population() {
    let err = SpectralModel::new(vec![-1.0, 0.5], vec![1.2, -0.2]).unwrap_err();
    assert_eq!(err.info().code, "negative-population");
}

#[test]
fn signal_at_zero_is_total_population() {
    let model = SpectralModel::new(vec![-1.0, 0.5, 2.0], vec![0.9, 0.07, 0.03]).unwrap();
    let z = model.signal(0.0);
    assert!((z.re - 1.0).abs() < 1e-12);
    assert!(z.im.abs() < 1e-12);
    let single = SpectralModel::new(vec![0.3], vec![1.0]).unwrap();
    let z = single.signal(2.0);
    assert!((z.re - (0.6_f64).cos()).abs() < 1e-12);
    assert!((z.im + (0.6_f64).sin()).abs() < 1e-12);
}

#[test]
fn cdf_steps_at_eigenvalues() {
    let model = SpectralModel::new(vec![-1.0, 0.5, 2.0], vec![0.9, 0.07, 0.03]).unwrap();
    assert_eq!(model.cdf(-2.0), 0.0);
    assert!((model.cdf(-1.0) - 0.9).abs() < 1e-12);
    assert!((model.cdf(1.0) - 0.97).abs() < 1e-12);
    assert!((model.cdf(3.0) - 1.0).abs() < 1e-12);
}

#[test]
fn spectrum_is_scaled_to_ham_shift() {
    let model = generate_spectrum_population(
        &[-4.0, -1.0, 2.0],
        &[0.2, 0.3, 0.5],
        &[],
        &ModelConfig::default(),
    )
    .unwrap();
    assert!((model.spectrum()[0] + FRAC_PI_4).abs() < 1e-12);
    assert!((model.spectrum()[2] - FRAC_PI_4 / 2.0).abs() < 1e-12);
}

#[test]
fn injected_overlap_is_exact_after_renormalisation() {
    let model = generate_spectrum_population(
        &[-3.0, -1.0, 0.0, 2.0],
        &[0.1, 0.2, 0.3, 0.4],
        &[0.8],
        &ModelConfig::default(),
    )
    .unwrap();
    assert!((model.reference_overlap() - 0.8).abs() < 1e-12);
    let total: f64 = model.population().iter().sum();
    assert!((total - 1.0).abs() < 1e-12);
}

#[test]
fn rejects_full_dominant_mass() {
    let err = generate_spectrum_population(&[-1.0, 1.0], &[0.5, 0.5], &[1.0], &ModelConfig::default())
        .unwrap_err();
    assert_eq!(err.info().code, "invalid-dominant-overlap");
}

proptest! {
    #[test]
    fn renormalised_population_sums_to_one(
        raw in proptest::collection::vec(0.01f64..1.0, 3..12),
        p0 in 0.05f64..0.95,
        seed_scale in 0.5f64..10.0,
    ) {
        let eig: Vec<f64> = (0..raw.len()).map(|k| (k as f64 - 1.5) * seed_scale).collect();
        let model = generate_spectrum_population(&eig, &raw, &[p0], &ModelConfig::default()).unwrap();
        let total: f64 = model.population().iter().sum();
        prop_assert!((total - 1.0).abs() < 1e-9);
        prop_assert!((model.reference_overlap() - p0).abs() < 1e-9);
        let max_abs = model.spectrum().iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        prop_assert!((max_abs - FRAC_PI_4).abs() < 1e-12);
    }
}
