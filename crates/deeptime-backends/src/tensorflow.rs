//! TensorFlow adapter.
//!
//! Evaluates every operation eagerly and sequentially. Symmetric inverses go
//! through a symmetric eigendecomposition, the equivalent of `tf.linalg.eigh`.

use crate::common::{
    check_finite, check_frames, check_matmul, check_square, spectral_inverse, thin_svd,
};
use deeptime_core::{
    backend::{Backend, Covariances, InverseMode, Svd},
    error::{BackendError as Error, Result},
    framework::Framework,
};
use nalgebra::DMatrix;

/// Backend adapter bound to the `"tensorflow"` identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct TensorFlowBackend;

impl TensorFlowBackend {
    /// Creates a new TensorFlow adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Backend for TensorFlowBackend {
    fn framework(&self) -> Framework {
        Framework::TensorFlow
    }

    fn matmul(&self, a: &DMatrix<f64>, b: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        check_matmul(a, b)?;
        Ok(a * b)
    }

    fn remove_mean(&self, x: &DMatrix<f64>) -> DMatrix<f64> {
        let mut centered = x.clone();
        for mut column in centered.column_iter_mut() {
            let mean = column.mean();
            column.add_scalar_mut(-mean);
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
        let norm = (frames - 1) as f64;

        Ok(Covariances {
            c00: x.tr_mul(&x) / norm,
            c0t: x.tr_mul(&y) / norm,
            ctt: y.tr_mul(&y) / norm,
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
        let eigen = m
            .clone()
            .try_symmetric_eigen(f64::EPSILON, 0)
            .ok_or_else(|| Error::numerical_error("symmetric eigendecomposition did not converge"))?;
        spectral_inverse(&eigen.eigenvectors, &eigen.eigenvalues, epsilon, mode)
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
    fn test_tensorflow_identity() {
        let backend = TensorFlowBackend::new();
        assert_eq!(backend.name(), "tensorflow");
        assert_eq!(backend.framework(), Framework::TensorFlow);
    }

    #[test]
    fn test_remove_mean() {
        let backend = TensorFlowBackend::new();
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 10.0, 2.0, 20.0, 3.0, 30.0]);
        let centered = backend.remove_mean(&x);

        assert_relative_eq!(
            centered,
            DMatrix::from_row_slice(3, 2, &[-1.0, -10.0, 0.0, 0.0, 1.0, 10.0]),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_covariances() {
        let backend = TensorFlowBackend::new();
        let x = DMatrix::from_row_slice(3, 1, &[1.0, 2.0, 3.0]);
        let y = DMatrix::from_row_slice(3, 1, &[2.0, 4.0, 6.0]);
        let cov = backend.covariances(&x, &y, true).unwrap();

        assert_relative_eq!(cov.c00[(0, 0)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(cov.c0t[(0, 0)], 2.0, epsilon = 1e-12);
        assert_relative_eq!(cov.ctt[(0, 0)], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sym_inverse() {
        let backend = TensorFlowBackend::new();
        let m = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 2.0]);

        let inv = backend.sym_inverse(&m, 1e-10, InverseMode::Regular).unwrap();
        assert_relative_eq!(&m * &inv, DMatrix::<f64>::identity(2, 2), epsilon = 1e-10);

        let isqrt = backend.sym_inverse(&m, 1e-10, InverseMode::Sqrt).unwrap();
        assert_relative_eq!(&isqrt * &m * &isqrt, DMatrix::<f64>::identity(2, 2), epsilon = 1e-10);
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        let backend = TensorFlowBackend::new();
        let m = DMatrix::from_row_slice(2, 2, &[f64::NAN, 1.0, 1.0, 2.0]);
        assert!(matches!(
            backend.sym_inverse(&m, 1e-10, InverseMode::Regular),
            Err(Error::NumericalError { .. })
        ));
        assert!(backend.svd(&m).is_err());

        let x = DMatrix::from_row_slice(2, 1, &[1.0, f64::INFINITY]);
        assert!(backend.covariances(&x, &x, false).is_err());
    }

    #[test]
    fn test_dimension_errors() {
        let backend = TensorFlowBackend::new();
        let a = DMatrix::<f64>::zeros(2, 3);
        let b = DMatrix::<f64>::zeros(2, 3);
        assert!(backend.matmul(&a, &b).is_err());
        assert!(backend.sym_inverse(&a, 1e-10, InverseMode::Regular).is_err());
    }
}
