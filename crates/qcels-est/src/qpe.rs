//! Textbook QPE baseline on a Fejér-kernel outcome distribution.

use qcels_core::errors::{ErrorInfo, QcelsError};
use qcels_core::{RngHandle, SpectralModel};
use qcels_filter::{draw_with_prob, grid_energy, qpe_distribution};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::QpeConfig;
use crate::large::CostLedger;

/// QPE estimate and its cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QpeEstimate {
    /// Lowest sampled grid energy.
    pub ground_energy: f64,
    /// Grid points `J = 2·depth`.
    pub grid: usize,
    /// Index of the lowest sampled grid point.
    pub index: usize,
    /// `depth · tries` total, `depth` max.
    pub cost: CostLedger,
}

/// Draws `tries` QPE outcomes and keeps the smallest energy.
pub fn qpe_estimate(
    model: &SpectralModel,
    config: &QpeConfig,
    rng: &mut RngHandle,
) -> Result<QpeEstimate, QcelsError> {
    config.validate()?;
    let grid = 2 * config.depth;
    let distribution = qpe_distribution(model, grid)?;
    let index = draw_with_prob(&distribution, config.tries, rng)?
        .into_iter()
        .min()
        .ok_or_else(|| {
            QcelsError::Estimation(ErrorInfo::new("no-qpe-draws", "qpe produced no outcomes"))
        })?;
    let depth = config.depth as f64;
    let mut cost = CostLedger::default();
    cost.add(depth * config.tries as f64, depth);
    let ground_energy = grid_energy(index, grid);
    info!(ground_energy, grid, tries = config.tries, "qpe baseline finished");
    Ok(QpeEstimate {
        ground_energy,
        grid,
        index,
        cost,
    })
}
