//! Process-wide backend state.
//!
//! The active backend is resolved at most once per process and is immutable
//! afterwards. A failed resolution stores nothing, so the process stays
//! unresolved and every later access reports the same configuration error.

use crate::resolver::{ActiveBackend, BackendResolver};
use deeptime_core::{Backend, ConfigurationError, EnvSource, Framework};
use once_cell::sync::OnceCell;

static ACTIVE: OnceCell<ActiveBackend> = OnceCell::new();

/// Returns the active backend, resolving it from the environment on first use.
pub fn active() -> Result<&'static ActiveBackend, ConfigurationError> {
    ACTIVE.get_or_try_init(|| BackendResolver::default().resolve(&EnvSource))
}

/// Resolves the backend from the environment during startup.
///
/// Calling this again after a successful resolution is a no-op.
pub fn init() -> Result<Framework, ConfigurationError> {
    active().map(ActiveBackend::framework)
}

/// Binds `framework` programmatically.
///
/// The environment is still validated: an unsupported value is fatal, and a
/// supported value naming a different framework fails with
/// [`ConfigurationError::ConflictingFramework`]. Fails with
/// [`ConfigurationError::AlreadyResolved`] if a different framework is
/// already active. Requesting the active framework again is a no-op.
pub fn init_with(framework: Framework) -> Result<&'static ActiveBackend, ConfigurationError> {
    let active = ACTIVE.get_or_try_init(|| {
        BackendResolver::default().resolve_requested(&EnvSource, framework)
    })?;
    if active.framework() != framework {
        return Err(ConfigurationError::already_resolved(
            active.framework(),
            framework,
        ));
    }
    Ok(active)
}

/// Whether a backend has been resolved in this process.
pub fn is_resolved() -> bool {
    ACTIVE.get().is_some()
}

/// Identifier of the active framework, e.g. `"tensorflow"`.
pub fn framework() -> Result<&'static str, ConfigurationError> {
    active().map(ActiveBackend::name)
}

/// The active framework.
pub fn active_framework() -> Result<Framework, ConfigurationError> {
    init()
}

/// The adapter bound for this process.
pub fn backend() -> Result<&'static dyn Backend, ConfigurationError> {
    active().map(ActiveBackend::backend)
}
