//! Validation and spectral helpers shared by the adapters.

use deeptime_core::{
    backend::{InverseMode, Svd},
    error::{BackendError as Error, Result},
};
use nalgebra::{DMatrix, DVector};

/// Checks that `x` and `y` describe the same number of frames, at least two.
pub(crate) fn check_frames(x: &DMatrix<f64>, y: &DMatrix<f64>) -> Result<usize> {
    if x.nrows() != y.nrows() {
        return Err(Error::dimension_mismatch(
            format!("{} frames", x.nrows()),
            format!("{} frames", y.nrows()),
        ));
    }
    if x.nrows() < 2 {
        return Err(Error::dimension_mismatch(
            "at least 2 frames",
            format!("{} frames", x.nrows()),
        ));
    }
    Ok(x.nrows())
}

pub(crate) fn check_matmul(a: &DMatrix<f64>, b: &DMatrix<f64>) -> Result<()> {
    if a.ncols() != b.nrows() {
        return Err(Error::dimension_mismatch(
            format!("{} rows", a.ncols()),
            format!("{} rows", b.nrows()),
        ));
    }
    Ok(())
}

pub(crate) fn check_square(m: &DMatrix<f64>) -> Result<()> {
    if !m.is_square() {
        return Err(Error::dimension_mismatch(
            "square matrix",
            format!("({}, {})", m.nrows(), m.ncols()),
        ));
    }
    Ok(())
}

/// Rejects NaN and infinite entries.
pub(crate) fn check_finite(m: &DMatrix<f64>) -> Result<()> {
    if m.iter().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(Error::numerical_error(format!(
            "({}, {}) matrix contains NaN or infinite entries",
            m.nrows(),
            m.ncols()
        )))
    }
}

/// Rebuilds `sum_i f(lambda_i) v_i v_i^T` over eigenpairs with `lambda_i > epsilon`,
/// where `f` is `1/x` or `1/sqrt(x)`.
pub(crate) fn spectral_inverse(
    eigenvectors: &DMatrix<f64>,
    eigenvalues: &DVector<f64>,
    epsilon: f64,
    mode: InverseMode,
) -> Result<DMatrix<f64>> {
    let kept: Vec<usize> = eigenvalues
        .iter()
        .enumerate()
        .filter(|(_, lambda)| **lambda > epsilon)
        .map(|(i, _)| i)
        .collect();
    if kept.is_empty() {
        return Err(Error::numerical_error(format!(
            "no eigenvalue above epsilon = {epsilon}"
        )));
    }

    let vectors = eigenvectors.select_columns(kept.iter());
    let scaled = eigenvalues.select_rows(kept.iter()).map(|lambda| match mode {
        InverseMode::Regular => 1.0 / lambda,
        InverseMode::Sqrt => 1.0 / lambda.sqrt(),
    });

    Ok(&vectors * DMatrix::from_diagonal(&scaled) * vectors.transpose())
}

/// Thin SVD with singular values sorted in descending order.
pub(crate) fn thin_svd(m: &DMatrix<f64>) -> Result<Svd> {
    check_finite(m)?;
    let svd = m
        .clone()
        .try_svd(true, true, f64::EPSILON, 0)
        .ok_or_else(|| Error::numerical_error("singular value decomposition did not converge"))?;
    let u = svd
        .u
        .ok_or_else(|| Error::numerical_error("left singular vectors were not computed"))?;
    let v_t = svd
        .v_t
        .ok_or_else(|| Error::numerical_error("right singular vectors were not computed"))?;

    let mut order: Vec<usize> = (0..svd.singular_values.len()).collect();
    order.sort_by(|&i, &j| svd.singular_values[j].total_cmp(&svd.singular_values[i]));

    Ok(Svd {
        u: u.select_columns(order.iter()),
        singular_values: svd.singular_values.select_rows(order.iter()),
        v_t: v_t.select_rows(order.iter()),
    })
}
