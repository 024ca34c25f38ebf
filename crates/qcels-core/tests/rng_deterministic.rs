use qcels_core::rng::{derive_substream_seed, substreams, RngHandle};
use rand::RngCore;

#[test]
fn rng_emits_reproducible_sequence() {
    let mut rng_a = RngHandle::from_seed(1234);
    let mut rng_b = RngHandle::from_seed(1234);

    let seq_a: Vec<u64> = (0..100).map(|_| rng_a.next_u64()).collect();
    let seq_b: Vec<u64> = (0..100).map(|_| rng_b.next_u64()).collect();

    assert_eq!(seq_a, seq_b);
}

#[test]
fn substreams_are_distinct_and_stable() {
    let a = derive_substream_seed(7, substreams::LEVEL_SAMPLES);
    let b = derive_substream_seed(7, substreams::ROUGH_CDF);
    assert_ne!(a, b);
    assert_eq!(a, derive_substream_seed(7, substreams::LEVEL_SAMPLES));

    let mut from_handle = RngHandle::for_substream(7, substreams::QPE);
    let mut manual = RngHandle::from_seed(derive_substream_seed(7, substreams::QPE));
    assert_eq!(from_handle.next_u64(), manual.next_u64());
}

#[test]
fn binomial_respects_extremes() {
    let mut rng = RngHandle::from_seed(5);
    assert_eq!(rng.binomial(200, 1.0), 200);
    assert_eq!(rng.binomial(200, 0.0), 0);
    assert_eq!(rng.binomial(50, 1.5), 50);
    assert_eq!(rng.binomial(0, 0.5), 0);
}

#[test]
fn binomial_mean_is_close_to_expectation() {
    let mut rng = RngHandle::from_seed(99);
    let trials = 20_000;
    let hits = rng.binomial(trials, 0.3);
    let freq = hits as f64 / trials as f64;
    assert!((freq - 0.3).abs() < 0.02, "frequency {freq}");
}
