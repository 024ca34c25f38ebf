#![deny(missing_docs)]
#![doc = "Eigenvalue filters, Fejér kernels and empirical CDF sampling used by the small-overlap QCELS path and the QPE baseline."]

pub mod cdf;
pub mod fejer;
pub mod fourier;

pub use cdf::{draw_with_prob, sample_xy, CdfSamples};
pub use fejer::{fejer_kernel, grid_energy, qpe_distribution};
pub use fourier::{FourierFilter, MOLLIFIER_WIDTHS};
