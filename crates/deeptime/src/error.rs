//! Errors surfaced by the backend-agnostic call surface.

use deeptime_core::{BackendError, ConfigurationError};
use thiserror::Error;

/// Errors from calling an operation through the active backend.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// No backend could be resolved for this process.
    #[error("Backend configuration failed: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The active backend rejected or failed the operation.
    #[error("Backend operation failed: {0}")]
    Backend(#[from] BackendError),
}

/// Result type alias for the call surface.
pub type Result<T> = std::result::Result<T, Error>;
