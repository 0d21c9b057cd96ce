//! PyTorch adapter.
//!
//! Covariances are reduced over mini-batches of frames in parallel, and
//! symmetric inverses are computed from a singular value decomposition.

use crate::common::{
    check_finite, check_frames, check_matmul, check_square, spectral_inverse, thin_svd,
};
use deeptime_core::{
    backend::{Backend, Covariances, InverseMode, Svd},
    error::{BackendError as Error, Result},
    framework::Framework,
};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

/// Frames per reduction batch.
const BATCH_FRAMES: usize = 256;

/// Relative gap below which singular values are treated as one cluster.
const CLUSTER_TOLERANCE: f64 = 1e-8;

/// Eigenpairs of a symmetric `m` recovered from its SVD.
///
/// Right singular vectors sharing a singular value `s` span an invariant
/// subspace of `m` that may mix the eigenvalues `+s` and `-s`. Each cluster is
/// diagonalised through its projection `V_c^T m V_c`; for a cluster of one
/// this is the Rayleigh quotient.
fn eigenpairs_from_svd(m: &DMatrix<f64>, svd: &Svd) -> Result<(DMatrix<f64>, DVector<f64>)> {
    let v = svd.v_t.transpose();
    let s = &svd.singular_values;
    let n = s.len();
    let tol = CLUSTER_TOLERANCE * s.iter().fold(0.0_f64, |acc, x| acc.max(*x));

    let mut vectors = DMatrix::zeros(v.nrows(), n);
    let mut values = DVector::zeros(n);
    let mut start = 0;
    while start < n {
        let mut end = start + 1;
        while end < n && s[start] - s[end] <= tol {
            end += 1;
        }
        let width = end - start;

        let basis = v.columns(start, width).into_owned();
        let projected = basis.tr_mul(m) * &basis;
        let projected = (&projected + projected.transpose()) * 0.5;
        let eigen = projected
            .try_symmetric_eigen(f64::EPSILON, 0)
            .ok_or_else(|| Error::numerical_error("projected eigendecomposition did not converge"))?;

        vectors
            .columns_mut(start, width)
            .copy_from(&(basis * eigen.eigenvectors));
        values.rows_mut(start, width).copy_from(&eigen.eigenvalues);
        start = end;
    }

    Ok((vectors, values))
}

/// Backend adapter bound to the `"pytorch"` identifier.
#[derive(Debug, Clone, Copy)]
pub struct PyTorchBackend {
    batch_frames: usize,
}

impl PyTorchBackend {
    /// Creates a new PyTorch adapter.
    pub fn new() -> Self {
        Self {
            batch_frames: BATCH_FRAMES,
        }
    }

    /// Sets the number of frames reduced per batch.
    pub fn with_batch_frames(mut self, batch_frames: usize) -> Self {
        self.batch_frames = batch_frames.max(1);
        self
    }

    /// Number of frames reduced per batch.
    pub fn batch_frames(&self) -> usize {
        self.batch_frames
    }
}

impl Default for PyTorchBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for PyTorchBackend {
    fn framework(&self) -> Framework {
        Framework::PyTorch
    }

    fn matmul(&self, a: &DMatrix<f64>, b: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        check_matmul(a, b)?;
        Ok(a * b)
    }

    fn remove_mean(&self, x: &DMatrix<f64>) -> DMatrix<f64> {
        let means = x.row_mean();
        let mut centered = x.clone();
        for mut row in centered.row_iter_mut() {
            row -= &means;
        }
        centered
    }

    fn covariances(
        &self,
        x: &DMatrix<f64>,
        y: &DMatrix<f64>,
        remove_mean: bool,
    ) -> Result<Covariances> {
        let frames = check_frames(x, y)?;
        check_finite(x)?;
        check_finite(y)?;
        let (x, y) = if remove_mean {
            (self.remove_mean(x), self.remove_mean(y))
        } else {
            (x.clone(), y.clone())
        };

        let (dx, dy) = (x.ncols(), y.ncols());
        let starts: Vec<usize> = (0..frames).step_by(self.batch_frames).collect();
        let (c00, c0t, ctt) = starts
            .par_iter()
            .map(|&start| {
                let len = self.batch_frames.min(frames - start);
                let xb = x.rows(start, len);
                let yb = y.rows(start, len);
                (xb.tr_mul(&xb), xb.tr_mul(&yb), yb.tr_mul(&yb))
            })
            .reduce(
                || {
                    (
                        DMatrix::zeros(dx, dx),
                        DMatrix::zeros(dx, dy),
                        DMatrix::zeros(dy, dy),
                    )
                },
                |a, b| (a.0 + b.0, a.1 + b.1, a.2 + b.2),
            );

        let norm = (frames - 1) as f64;
        Ok(Covariances {
            c00: c00 / norm,
            c0t: c0t / norm,
            ctt: ctt / norm,
        })
    }

    fn sym_inverse(
        &self,
        m: &DMatrix<f64>,
        epsilon: f64,
        mode: InverseMode,
    ) -> Result<DMatrix<f64>> {
        check_square(m)?;
        check_finite(m)?;
        let svd = thin_svd(m)?;
        let (vectors, eigenvalues) = eigenpairs_from_svd(m, &svd)?;
        spectral_inverse(&vectors, &eigenvalues, epsilon, mode)
    }

    fn svd(&self, m: &DMatrix<f64>) -> Result<Svd> {
        thin_svd(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pytorch_identity() {
        let backend = PyTorchBackend::new();
        assert_eq!(backend.name(), "pytorch");
        assert_eq!(backend.framework(), Framework::PyTorch);
        assert_eq!(backend.batch_frames(), BATCH_FRAMES);
        assert_eq!(backend.with_batch_frames(0).batch_frames(), 1);
    }

    #[test]
    fn test_batched_covariances_match_single_batch() {
        let x = DMatrix::from_fn(37, 3, |i, j| ((i * 7 + j * 3) as f64 * 0.37).sin());
        let y = DMatrix::from_fn(37, 2, |i, j| ((i * 5 + j) as f64 * 0.21).cos());

        let small = PyTorchBackend::new().with_batch_frames(4);
        let whole = PyTorchBackend::new().with_batch_frames(1000);
        let a = small.covariances(&x, &y, true).unwrap();
        let b = whole.covariances(&x, &y, true).unwrap();

        assert_relative_eq!(a.c00, b.c00, epsilon = 1e-12);
        assert_relative_eq!(a.c0t, b.c0t, epsilon = 1e-12);
        assert_relative_eq!(a.ctt, b.ctt, epsilon = 1e-12);
    }

    #[test]
    fn test_sym_inverse_discards_negative_spectrum() {
        let backend = PyTorchBackend::new();
        let m = DMatrix::from_row_slice(2, 2, &[4.0, 0.0, 0.0, -9.0]);

        let inv = backend.sym_inverse(&m, 1e-10, InverseMode::Regular).unwrap();
        assert_relative_eq!(
            inv,
            DMatrix::from_row_slice(2, 2, &[0.25, 0.0, 0.0, 0.0]),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_sym_inverse_of_indefinite_matrix() {
        let backend = PyTorchBackend::new();
        // Eigenvalues +1 and -1 share the singular value 1.
        let m = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 0.0]);

        let inv = backend.sym_inverse(&m, 1e-10, InverseMode::Regular).unwrap();
        assert_relative_eq!(
            inv,
            DMatrix::from_row_slice(2, 2, &[0.5, 0.5, 0.5, 0.5]),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        let backend = PyTorchBackend::new();
        let m = DMatrix::from_row_slice(2, 2, &[f64::NAN, 1.0, 1.0, 2.0]);
        assert!(backend.sym_inverse(&m, 1e-10, InverseMode::Regular).is_err());
        assert!(backend.svd(&m).is_err());
        assert!(backend.covariances(&m, &m, true).is_err());
    }

    #[test]
    fn test_remove_mean() {
        let backend = PyTorchBackend::new();
        let x = DMatrix::from_row_slice(2, 2, &[1.0, 5.0, 3.0, 7.0]);
        let centered = backend.remove_mean(&x);
        assert_relative_eq!(
            centered,
            DMatrix::from_row_slice(2, 2, &[-1.0, -1.0, 1.0, 1.0]),
            epsilon = 1e-12
        );
    }
}
