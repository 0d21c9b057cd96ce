//! deeptime - backend-agnostic numerical operations.
//!
//! One computation framework is chosen per process, either TensorFlow (the
//! default) or PyTorch. The choice is read once from the `DEEPTIME_FRAMEWORK`
//! environment variable, validated against the supported set, and bound for
//! the lifetime of the process. Operations are then called through the free
//! functions re-exported here, which forward to the bound adapter.
//!
//! ```no_run
//! # fn main() -> deeptime::Result<()> {
//! use nalgebra::DMatrix;
//!
//! // Fails on e.g. DEEPTIME_FRAMEWORK=theano
//! let framework = deeptime::init()?;
//! println!("running on {framework}");
//!
//! let x = DMatrix::from_fn(100, 2, |i, j| ((i + j) as f64).sin());
//! let y = DMatrix::from_fn(100, 2, |i, j| ((i + j + 1) as f64).sin());
//! let score = deeptime::vamp_score(&x, &y, deeptime::ScoreMethod::Vamp2, 1e-6)?;
//! assert!(score >= 1.0);
//! assert_eq!(deeptime::framework()?, framework.as_str());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod global;
pub mod ops;
pub mod resolver;

pub use error::{Error, Result};
pub use global::{active, active_framework, backend, framework, init, init_with, is_resolved};
pub use ops::*;
pub use resolver::{ActiveBackend, AdapterLoader, BackendResolver};

// Re-export core types
pub use deeptime_core::{
    Backend, BackendError, ConfigSource, ConfigurationError, Covariances, EnvSource, Framework,
    InverseMode, MapSource, ResolverConfig, ResolverConfigBuilder, ScoreMethod, Svd,
    FRAMEWORK_ENV_KEY, SUPPORTED_FRAMEWORKS,
};

// Re-export adapters
#[cfg(feature = "pytorch")]
pub use deeptime_backends::PyTorchBackend;
#[cfg(feature = "tensorflow")]
pub use deeptime_backends::TensorFlowBackend;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::global::{framework, init};
    pub use crate::ops::*;
    pub use deeptime_core::prelude::*;
}
