//! Deterministic RNG wrapper and seed-derivation helpers.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// Substream identifiers used by the estimation drivers.
///
/// The rough estimate, the level samples and the QPE baseline never share a
/// random sequence.
pub mod substreams {
    /// Unfiltered level sampling.
    pub const LEVEL_SAMPLES: u64 = 1;
    /// Rough CDF estimate in the small-overlap driver.
    pub const ROUGH_CDF: u64 = 2;
    /// Filtered level sampling in the small-overlap driver.
    pub const FILTERED_SAMPLES: u64 = 3;
    /// QPE baseline draws.
    pub const QPE: u64 = 4;
}

/// Deterministic RNG handle used by every sampler.
///
/// The handle is a thin wrapper around `StdRng`. A master `seed: u64` must be
/// provided by the caller. Substreams are derived by hashing
/// `(master_seed, substream_id)` with SipHash-1-3 configured with fixed zero
/// keys, so a run is reproducible across platforms.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Creates a new RNG handle from a master seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a handle on a derived substream of `master_seed`.
    pub fn for_substream(master_seed: u64, substream: u64) -> Self {
        Self::from_seed(derive_substream_seed(master_seed, substream))
    }

    /// Draws a uniform variate in `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Counts successes in `trials` independent Bernoulli(`p`) draws.
    ///
    /// `p` is clamped into `[0, 1]` so rounding noise in the caller cannot
    /// produce impossible probabilities.
    pub fn binomial(&mut self, trials: usize, p: f64) -> usize {
        let p = p.clamp(0.0, 1.0);
        (0..trials).filter(|_| self.uniform() < p).count()
    }

    /// Returns a mutable reference to the underlying RNG for advanced usage.
    pub fn inner_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// Derives the deterministic seed for a specific substream.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}
