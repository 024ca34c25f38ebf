#![allow(dead_code)]

use qcels_core::errors::QcelsError;
use qcels_core::SpectralModel;
use qcels_sample::{Sample, Sampler, SamplerKind};

/// Noiseless sampler returning the exact signal, charged `t` per call.
pub struct ExactSampler {
    pub model: SpectralModel,
    pub calls: usize,
}

impl ExactSampler {
    pub fn new(model: SpectralModel) -> Self {
        Self { model, calls: 0 }
    }
}

impl Sampler for ExactSampler {
    fn kind(&self) -> SamplerKind {
        SamplerKind::Theory
    }

    fn sample(&mut self, t: f64) -> Result<Sample, QcelsError> {
        self.calls += 1;
        Ok(Sample {
            value: self.model.signal(t),
            cost: t,
            max_time: t,
        })
    }
}

/// Sampler whose backend fails after a number of successful calls.
pub struct FlakySampler {
    pub inner: ExactSampler,
    pub fail_after: usize,
}

impl Sampler for FlakySampler {
    fn kind(&self) -> SamplerKind {
        SamplerKind::Hardware
    }

    fn sample(&mut self, t: f64) -> Result<Sample, QcelsError> {
        if self.inner.calls >= self.fail_after {
            return Err(QcelsError::sampling("backend-unreachable", "shot backend went away"));
        }
        self.inner.sample(t)
    }
}

pub fn single_level_model(lambda: f64) -> SpectralModel {
    SpectralModel::new(vec![lambda], vec![1.0]).unwrap()
}

pub fn three_level_model() -> SpectralModel {
    SpectralModel::new(vec![-1.0, 0.5, 2.0], vec![0.9, 0.07, 0.03]).unwrap()
}
