//! Backend-agnostic operations.
//!
//! Every function here forwards to the adapter resolved for the process, so
//! the same call works unchanged whichever framework is active. The first
//! call resolves the backend if nothing has yet.

use crate::{error::Result, global};
use deeptime_core::{Covariances, InverseMode, ScoreMethod, Svd};
use nalgebra::DMatrix;

/// Matrix product `a * b`.
pub fn matmul(a: &DMatrix<f64>, b: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    Ok(global::backend()?.matmul(a, b)?)
}

/// Subtracts the column means from a data matrix.
pub fn remove_mean(x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    Ok(global::backend()?.remove_mean(x))
}

/// Instantaneous, cross and time-lagged covariances of a data pair.
pub fn covariances(x: &DMatrix<f64>, y: &DMatrix<f64>, remove_mean: bool) -> Result<Covariances> {
    Ok(global::backend()?.covariances(x, y, remove_mean)?)
}

/// Inverse or inverse square root of a symmetric matrix.
pub fn sym_inverse(m: &DMatrix<f64>, epsilon: f64, mode: InverseMode) -> Result<DMatrix<f64>> {
    Ok(global::backend()?.sym_inverse(m, epsilon, mode)?)
}

/// Thin singular value decomposition.
pub fn svd(m: &DMatrix<f64>) -> Result<Svd> {
    Ok(global::backend()?.svd(m)?)
}

/// Koopman matrix estimated from a data pair.
pub fn koopman_matrix(x: &DMatrix<f64>, y: &DMatrix<f64>, epsilon: f64) -> Result<DMatrix<f64>> {
    Ok(global::backend()?.koopman_matrix(x, y, epsilon)?)
}

/// VAMP score of a data pair.
pub fn vamp_score(
    x: &DMatrix<f64>,
    y: &DMatrix<f64>,
    method: ScoreMethod,
    epsilon: f64,
) -> Result<f64> {
    Ok(global::backend()?.vamp_score(x, y, method, epsilon)?)
}
