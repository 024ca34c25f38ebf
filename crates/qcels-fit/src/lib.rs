#![deny(missing_docs)]
#![doc = "Bounded least-squares fit of `(a + ib)·exp(−iλt)` to noisy time-domain samples."]

pub mod params;
pub mod solver;

pub use params::{FitBounds, FitOpts, FitOutcome, FitParams};
pub use solver::{fit, objective};
