use std::sync::Arc;

use qcels_core::{RngHandle, SpectralModel};
use qcels_filter::FourierFilter;
use qcels_sample::{sample_filtered, FilteredSampler, Sampler, SamplerKind};

fn model() -> SpectralModel {
    SpectralModel::new(vec![-0.6, 0.4, 1.0], vec![0.3, 0.4, 0.3]).unwrap()
}

#[test]
fn filtered_cost_includes_filter_time() {
    let filter = FourierFilter::new(40, 0.1).unwrap();
    let mut rng = RngHandle::from_seed(6);
    let sample = sample_filtered(&model(), &filter, -0.3, 2.0, 30, 2, &mut rng).unwrap();
    assert!(sample.cost >= 2.0 * 60.0);
    assert!(sample.cost <= 2.0 * 60.0 + 40.0 * 60.0);
    assert!(sample.max_time >= 2.0 && sample.max_time <= 42.0);
}

#[test]
fn filtered_signal_isolates_ground_state() {
    let model = model();
    let filter = FourierFilter::new(200, 0.1).unwrap();
    let mut rng = RngHandle::from_seed(8);
    let t = 1.5;
    let sample = sample_filtered(&model, &filter, -0.1, t, 60_000, 1, &mut rng).unwrap();
    let lambda = model.spectrum()[0];
    let expected = 0.3 * num_complex::Complex64::from_polar(1.0, -lambda * t);
    assert!((sample.value - expected).norm() < 0.08);
}

#[test]
fn filtered_sampler_validates_inputs() {
    let filter = Arc::new(FourierFilter::new(10, 0.2).unwrap());
    let rng = RngHandle::from_seed(1);
    assert!(FilteredSampler::new(model(), filter.clone(), 0.0, 0, 1, rng.clone()).is_err());
    assert!(FilteredSampler::new(model(), filter.clone(), 0.0, 5, 0, rng.clone()).is_err());
    assert!(FilteredSampler::new(model(), filter.clone(), f64::NAN, 5, 1, rng.clone()).is_err());
    let mut sampler = FilteredSampler::new(model(), filter, 0.25, 5, 1, rng).unwrap();
    assert_eq!(sampler.kind(), SamplerKind::Filtered);
    assert_eq!(sampler.center(), 0.25);
    assert!(sampler.set_nsample(0).is_err());
    sampler.set_nsample(12).unwrap();
    assert!(sampler.sample(0.5).is_ok());
}
