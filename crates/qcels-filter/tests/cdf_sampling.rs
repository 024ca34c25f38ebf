use qcels_core::{RngHandle, SpectralModel};
use qcels_filter::{draw_with_prob, sample_xy, FourierFilter};

fn model() -> SpectralModel {
    SpectralModel::new(vec![-0.5, 0.1, 0.6], vec![0.6, 0.3, 0.1]).unwrap()
}

#[test]
fn draw_with_prob_never_selects_zero_weight() {
    let mut rng = RngHandle::from_seed(3);
    let draws = draw_with_prob(&[0.0, 2.0, 0.0, 1.0], 2000, &mut rng).unwrap();
    assert!(draws.iter().all(|idx| *idx == 1 || *idx == 3));
    let ones = draws.iter().filter(|idx| **idx == 1).count() as f64 / 2000.0;
    assert!((ones - 2.0 / 3.0).abs() < 0.05);
}

#[test]
fn draw_with_prob_rejects_bad_distributions() {
    let mut rng = RngHandle::from_seed(3);
    assert!(draw_with_prob(&[], 4, &mut rng).is_err());
    assert!(draw_with_prob(&[0.0, 0.0], 4, &mut rng).is_err());
    assert!(draw_with_prob(&[0.5, -0.1], 4, &mut rng).is_err());
}

#[test]
fn sample_xy_rejects_zero_counts() {
    let filter = FourierFilter::new(10, 0.2).unwrap();
    let mut rng = RngHandle::from_seed(1);
    let err = sample_xy(&model(), &filter, 0, 1, 0.0, &mut rng).unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(sample_xy(&model(), &filter, 10, 0, 0.0, &mut rng).is_err());
}

#[test]
fn empirical_cdf_tracks_spectral_cdf() {
    let model = model();
    let filter = FourierFilter::new(120, 0.1).unwrap();
    let mut rng = RngHandle::from_seed(11);
    let samples = sample_xy(&model, &filter, 40_000, 1, 0.0, &mut rng).unwrap();
    let cdf = samples.cdf_at(&[-0.9, -0.2, 0.35, 0.9], &filter);
    let expected = [0.0, 0.6, 0.9, 1.0];
    for (got, want) in cdf.iter().zip(expected) {
        assert!((got - want).abs() < 0.1, "cdf {got} vs {want}");
    }
}

#[test]
fn cost_bookkeeping_matches_orders() {
    let filter = FourierFilter::new(12, 0.2).unwrap();
    let mut rng = RngHandle::from_seed(8);
    let samples = sample_xy(&model(), &filter, 50, 2, 0.0, &mut rng).unwrap();
    assert_eq!(samples.len(), 100);
    let manual: f64 = samples.orders.iter().map(|j| j.abs() as f64).sum();
    assert_eq!(samples.total_evolution_time(), manual);
    assert!(samples.max_evolution_time() <= 12.0);
    assert!(samples.orders.iter().all(|j| j % 2 != 0 || *j == 0));
}

#[test]
fn same_seed_same_samples() {
    let filter = FourierFilter::new(12, 0.2).unwrap();
    let a = sample_xy(&model(), &filter, 64, 1, 1.5, &mut RngHandle::from_seed(21)).unwrap();
    let b = sample_xy(&model(), &filter, 64, 1, 1.5, &mut RngHandle::from_seed(21)).unwrap();
    assert_eq!(a, b);
}
