#![deny(missing_docs)]
#![doc = "Core error taxonomy, deterministic seeding and the spectral model shared by the QCELS estimator crates."]

pub mod errors;
pub mod model;
pub mod provenance;
pub mod rng;

pub use errors::{ErrorInfo, QcelsError};
pub use model::{generate_spectrum_population, ModelConfig, SpectralModel, POPULATION_TOLERANCE};
pub use num_complex::Complex64;
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};
