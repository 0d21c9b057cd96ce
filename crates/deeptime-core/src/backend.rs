//! The capability interface every backend adapter implements.
//!
//! Downstream code never talks to a concrete adapter. It calls the operations
//! listed on [`Backend`] through whichever adapter was resolved for the
//! process, so call sites are identical regardless of the framework in use.
//!
//! Data matrices are laid out with one frame per row and one feature per
//! column. `x` holds instantaneous frames and `y` the time-lagged ones.

use crate::{
    error::{BackendError as Error, Result},
    framework::Framework,
};
use nalgebra::{DMatrix, DVector};
use std::fmt::{self, Debug};
use std::str::FromStr;

/// Instantaneous, time-lagged and cross covariance matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct Covariances {
    /// Covariance of `x` with itself.
    pub c00: DMatrix<f64>,
    /// Cross covariance of `x` with `y`.
    pub c0t: DMatrix<f64>,
    /// Covariance of `y` with itself.
    pub ctt: DMatrix<f64>,
}

/// Thin singular value decomposition `m = u * diag(singular_values) * v_t`.
#[derive(Debug, Clone, PartialEq)]
pub struct Svd {
    /// Left singular vectors, one per column.
    pub u: DMatrix<f64>,
    /// Singular values in descending order.
    pub singular_values: DVector<f64>,
    /// Right singular vectors, one per row.
    pub v_t: DMatrix<f64>,
}

/// Which inverse [`Backend::sym_inverse`] computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InverseMode {
    /// `m^{-1}`
    #[default]
    Regular,
    /// `m^{-1/2}`
    Sqrt,
}

/// VAMP score variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreMethod {
    /// Nuclear norm of the Koopman matrix.
    Vamp1,
    /// Squared Frobenius norm of the Koopman matrix.
    #[default]
    Vamp2,
    /// Score of the rank-truncated Koopman model.
    VampE,
}

impl ScoreMethod {
    /// Conventional name of the method.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vamp1 => "VAMP1",
            Self::Vamp2 => "VAMP2",
            Self::VampE => "VAMPE",
        }
    }
}

impl fmt::Display for ScoreMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoreMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "VAMP1" => Ok(Self::Vamp1),
            "VAMP2" => Ok(Self::Vamp2),
            "VAMPE" => Ok(Self::VampE),
            other => Err(format!("unknown VAMP score method {:?}", other)),
        }
    }
}

/// Trait for backend adapters.
///
/// The trait is dyn-compatible; the resolver stores the chosen adapter as a
/// `Box<dyn Backend>` for the lifetime of the process.
pub trait Backend: Debug + Send + Sync {
    /// Framework this adapter binds.
    fn framework(&self) -> Framework;

    /// Adapter name; identical to the framework identifier.
    fn name(&self) -> &'static str {
        self.framework().as_str()
    }

    /// Matrix product `a * b`.
    fn matmul(&self, a: &DMatrix<f64>, b: &DMatrix<f64>) -> Result<DMatrix<f64>>;

    /// Subtracts the column means from a data matrix.
    fn remove_mean(&self, x: &DMatrix<f64>) -> DMatrix<f64>;

    /// Computes `(c00, c0t, ctt)` with `1 / (n - 1)` normalisation.
    ///
    /// `x` and `y` must have the same number of frames, and at least two.
    fn covariances(
        &self,
        x: &DMatrix<f64>,
        y: &DMatrix<f64>,
        remove_mean: bool,
    ) -> Result<Covariances>;

    /// Inverse or inverse square root of a symmetric matrix.
    ///
    /// Eigenvalues `<= epsilon` are discarded, which regularises
    /// rank-deficient covariances.
    fn sym_inverse(
        &self,
        m: &DMatrix<f64>,
        epsilon: f64,
        mode: InverseMode,
    ) -> Result<DMatrix<f64>>;

    /// Thin singular value decomposition.
    fn svd(&self, m: &DMatrix<f64>) -> Result<Svd>;

    /// Koopman matrix `c00^{-1/2} * c0t * ctt^{-1/2}` estimated from data.
    fn koopman_matrix(
        &self,
        x: &DMatrix<f64>,
        y: &DMatrix<f64>,
        epsilon: f64,
    ) -> Result<DMatrix<f64>> {
        let cov = self.covariances(x, y, true)?;
        koopman_from_covariances(self, &cov, epsilon)
    }

    /// VAMP score of the data pair.
    ///
    /// Every variant includes the constant singular function, so the score
    /// of any non-degenerate input is at least one.
    fn vamp_score(
        &self,
        x: &DMatrix<f64>,
        y: &DMatrix<f64>,
        method: ScoreMethod,
        epsilon: f64,
    ) -> Result<f64> {
        let cov = self.covariances(x, y, true)?;
        let koopman = koopman_from_covariances(self, &cov, epsilon)?;

        let score = match method {
            ScoreMethod::Vamp1 => self.svd(&koopman)?.singular_values.sum(),
            ScoreMethod::Vamp2 => koopman.norm_squared(),
            ScoreMethod::VampE => vampe_score(self, &cov, &koopman, epsilon)?,
        };

        Ok(1.0 + score)
    }
}

fn koopman_from_covariances<B: Backend + ?Sized>(
    backend: &B,
    cov: &Covariances,
    epsilon: f64,
) -> Result<DMatrix<f64>> {
    let c00_isqrt = backend.sym_inverse(&cov.c00, epsilon, InverseMode::Sqrt)?;
    let ctt_isqrt = backend.sym_inverse(&cov.ctt, epsilon, InverseMode::Sqrt)?;
    let left = backend.matmul(&c00_isqrt, &cov.c0t)?;
    backend.matmul(&left, &ctt_isqrt)
}

fn vampe_score<B: Backend + ?Sized>(
    backend: &B,
    cov: &Covariances,
    koopman: &DMatrix<f64>,
    epsilon: f64,
) -> Result<f64> {
    let svd = backend.svd(koopman)?;
    let kept: Vec<usize> = svd
        .singular_values
        .iter()
        .enumerate()
        .filter(|(_, s)| **s > epsilon)
        .map(|(i, _)| i)
        .collect();
    if kept.is_empty() {
        return Err(Error::numerical_error(
            "all singular values of the Koopman matrix are below epsilon",
        ));
    }

    let u = svd.u.select_columns(kept.iter());
    let v = svd.v_t.transpose().select_columns(kept.iter());
    let s = DMatrix::from_diagonal(&svd.singular_values.select_rows(kept.iter()));

    let c00_isqrt = backend.sym_inverse(&cov.c00, epsilon, InverseMode::Sqrt)?;
    let ctt_isqrt = backend.sym_inverse(&cov.ctt, epsilon, InverseMode::Sqrt)?;
    let u = backend.matmul(&c00_isqrt, &u)?;
    let v = backend.matmul(&ctt_isqrt, &v)?;

    // tr(2 S U^T C0t V - S U^T C00 U S V^T Ctt V)
    let u_t = u.transpose();
    let v_t = v.transpose();
    let cross = &s * &u_t * &cov.c0t * &v;
    let inst = &s * &u_t * &cov.c00 * &u;
    let lagged = &s * &v_t * &cov.ctt * &v;

    Ok((2.0 * cross - inst * lagged).trace())
}
