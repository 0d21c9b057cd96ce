//! Backend adapters for deeptime.
//!
//! Each adapter binds the operations of [`Backend`] for one supported
//! framework and is compiled in through the cargo feature of the same name.
//! [`load`] is the dispatch table from a validated [`Framework`] to an
//! adapter instance.

#[cfg(any(feature = "tensorflow", feature = "pytorch"))]
mod common;

#[cfg(feature = "pytorch")]
pub mod pytorch;
#[cfg(feature = "tensorflow")]
pub mod tensorflow;

#[cfg(feature = "pytorch")]
pub use pytorch::PyTorchBackend;
#[cfg(feature = "tensorflow")]
pub use tensorflow::TensorFlowBackend;

use deeptime_core::{Backend, Framework};

/// Instantiates the adapter for `framework`.
///
/// Returns `None` when the adapter was not compiled into this build.
pub fn load(framework: Framework) -> Option<Box<dyn Backend>> {
    match framework {
        #[cfg(feature = "tensorflow")]
        Framework::TensorFlow => Some(Box::new(TensorFlowBackend::new())),
        #[cfg(feature = "pytorch")]
        Framework::PyTorch => Some(Box::new(PyTorchBackend::new())),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

/// Whether the adapter for `framework` is compiled in.
pub const fn is_available(framework: Framework) -> bool {
    match framework {
        Framework::TensorFlow => cfg!(feature = "tensorflow"),
        Framework::PyTorch => cfg!(feature = "pytorch"),
    }
}

/// Frameworks with a compiled-in adapter, in supported-set order.
pub fn available() -> Vec<Framework> {
    Framework::ALL
        .into_iter()
        .filter(|fw| is_available(*fw))
        .collect()
}
