//! Core traits and types for deeptime computation backends.
//!
//! This crate defines what a backend is and how one is chosen, without
//! depending on any concrete backend.
//!
//! # Modules
//!
//! - [`backend`]: The [`Backend`](backend::Backend) capability interface
//! - [`config`]: Resolver configuration and configuration sources
//! - [`error`]: Configuration and backend error types
//! - [`framework`]: The closed set of supported frameworks

pub mod backend;
pub mod config;
pub mod error;
pub mod framework;

// Re-export commonly used items at the crate root
pub use backend::{Backend, Covariances, InverseMode, ScoreMethod, Svd};
pub use config::{
    ConfigSource, EnvSource, MapSource, ResolverConfig, ResolverConfigBuilder, FRAMEWORK_ENV_KEY,
};
pub use error::{BackendError, ConfigurationError, Result, SupportedList};
pub use framework::{Framework, UnknownFramework, SUPPORTED_FRAMEWORKS};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use deeptime_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backend::{Backend, Covariances, InverseMode, ScoreMethod, Svd};
    pub use crate::config::{ConfigSource, EnvSource, MapSource, ResolverConfig};
    pub use crate::error::{BackendError, ConfigurationError, Result};
    pub use crate::framework::Framework;
    pub use nalgebra::{DMatrix, DVector};
}
