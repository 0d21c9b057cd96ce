//! Error types for backend resolution and backend operations.
//!
//! Resolution failures are [`ConfigurationError`]s. They are fatal: nothing
//! retries them and nothing falls back to the default backend once an
//! explicit (invalid) choice was supplied. Failures inside an adapter's
//! numerical routines are [`BackendError`]s.

use crate::framework::{Framework, SUPPORTED_FRAMEWORKS};
use std::fmt;
use thiserror::Error;

/// The full supported set, rendered for diagnostics as `("tensorflow", "pytorch")`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportedList(pub &'static [&'static str]);

impl fmt::Display for SupportedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", name)?;
        }
        write!(f, ")")
    }
}

/// Errors raised while resolving the active backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The configured identifier is not a member of the supported set.
    ///
    /// This is an external misconfiguration: the message names the offending
    /// value and every valid choice so it can be fixed without reading source.
    #[error("Found environment variable {key}={value} but only {supported} are valid choices.")]
    UnsupportedFramework {
        /// Configuration key the value was read from
        key: String,
        /// The rejected value, verbatim
        value: String,
        /// Every supported identifier
        supported: SupportedList,
    },

    /// A valid identifier has no adapter compiled into this build.
    ///
    /// This is an internal completeness problem, distinct from
    /// [`ConfigurationError::UnsupportedFramework`].
    #[error("Selected framework is {framework} although only frameworks {supported} are available.")]
    MissingAdapter {
        /// The validated identifier with no adapter
        framework: Framework,
        /// Every supported identifier
        supported: SupportedList,
    },

    /// A framework was requested programmatically while the configuration
    /// names a different one.
    #[error("Found environment variable {key}={configured} but framework {requested} was requested")]
    ConflictingFramework {
        /// Configuration key the value was read from
        key: String,
        /// The framework named by the configuration
        configured: Framework,
        /// The framework requested by the caller
        requested: Framework,
    },

    /// A backend was already resolved and a different one was requested.
    #[error("Backend already resolved to {active}; cannot switch to {requested}")]
    AlreadyResolved {
        /// The framework bound for the rest of the process
        active: Framework,
        /// The framework that was requested afterwards
        requested: Framework,
    },
}

impl ConfigurationError {
    /// Create an UnsupportedFramework error for a rejected value.
    pub fn unsupported_framework<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::UnsupportedFramework {
            key: key.into(),
            value: value.into(),
            supported: SupportedList(&SUPPORTED_FRAMEWORKS),
        }
    }

    /// Create a MissingAdapter error for a validated framework.
    pub fn missing_adapter(framework: Framework) -> Self {
        Self::MissingAdapter {
            framework,
            supported: SupportedList(&SUPPORTED_FRAMEWORKS),
        }
    }

    /// Create a ConflictingFramework error.
    pub fn conflicting_framework<K: Into<String>>(
        key: K,
        configured: Framework,
        requested: Framework,
    ) -> Self {
        Self::ConflictingFramework {
            key: key.into(),
            configured,
            requested,
        }
    }

    /// Create an AlreadyResolved error.
    pub fn already_resolved(active: Framework, requested: Framework) -> Self {
        Self::AlreadyResolved { active, requested }
    }

    /// True when the caller supplied bad configuration.
    pub fn is_misconfiguration(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFramework { .. }
                | Self::ConflictingFramework { .. }
                | Self::AlreadyResolved { .. }
        )
    }

    /// True when the build itself is incomplete.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::MissingAdapter { .. })
    }
}

/// Errors that can occur inside a backend operation.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// Dimension mismatch between operands.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions
        expected: String,
        /// Actual dimensions
        actual: String,
    },

    /// Numerical failure, e.g. a decomposition that did not converge or a
    /// matrix whose spectrum was entirely discarded.
    #[error("Numerical instability detected: {reason}")]
    NumericalError {
        /// Description of the numerical issue
        reason: String,
    },
}

impl BackendError {
    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: fmt::Display,
        S2: fmt::Display,
    {
        Self::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a NumericalError with a custom reason.
    pub fn numerical_error<S: Into<String>>(reason: S) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }
}

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;
