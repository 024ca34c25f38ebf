//! Fejér kernel and the textbook QPE outcome distribution built from it.

use std::f64::consts::{PI, TAU};

use qcels_core::errors::{require_positive_count, QcelsError};
use qcels_core::SpectralModel;

/// `(1/T) · sin²(Tx/2) / sin²(x/2)`, continued by `T` at multiples of 2π.
pub fn fejer_kernel(order: usize, x: f64) -> f64 {
    let t = order as f64;
    let wrapped = x.rem_euclid(TAU);
    if wrapped < 1e-8 || TAU - wrapped < 1e-8 {
        return t;
    }
    let numer = (0.5 * t * x).sin().powi(2);
    let denom = (0.5 * x).sin().powi(2);
    numer / denom / t
}

/// Probability of reading grid point `j` on a `grid`-point QPE register.
///
/// Grid point `j` encodes the energy `2πj/grid − π`; the entries sum to one.
pub fn qpe_distribution(model: &SpectralModel, grid: usize) -> Result<Vec<f64>, QcelsError> {
    require_positive_count("grid", grid)?;
    let scale = grid as f64;
    let dist = (0..grid)
        .map(|j| {
            let x = TAU * j as f64 / scale - PI;
            model
                .spectrum()
                .iter()
                .zip(model.population())
                .map(|(lambda, p)| p * fejer_kernel(grid, x - lambda) / scale)
                .sum()
        })
        .collect();
    Ok(dist)
}

/// Energy encoded by grid point `j` of a `grid`-point register.
pub fn grid_energy(index: usize, grid: usize) -> f64 {
    TAU * index as f64 / grid as f64 - PI
}
