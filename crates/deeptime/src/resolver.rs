//! Backend resolution.
//!
//! Resolution turns one configuration value into a bound adapter:
//!
//! 1. key absent: use the configured default framework
//! 2. key present: parse the value exactly, rejecting anything outside the
//!    supported set with [`ConfigurationError::UnsupportedFramework`]
//! 3. load the adapter for the parsed framework, failing with
//!    [`ConfigurationError::MissingAdapter`] if it is not compiled in
//!
//! [`BackendResolver`] performs these steps against any [`ConfigSource`].
//! The process-wide state built on top of it lives in [`crate::global`].

use deeptime_core::{
    Backend, ConfigSource, ConfigurationError, Framework, ResolverConfig,
};
use std::fmt;
use tracing::{debug, info, warn};

/// Loads the adapter for a framework, `None` if there is none.
pub type AdapterLoader = fn(Framework) -> Option<Box<dyn Backend>>;

/// A resolved framework together with its bound adapter.
#[derive(Debug)]
pub struct ActiveBackend {
    framework: Framework,
    backend: Box<dyn Backend>,
}

impl ActiveBackend {
    /// The resolved framework.
    pub fn framework(&self) -> Framework {
        self.framework
    }

    /// The resolved framework identifier.
    pub fn name(&self) -> &'static str {
        self.framework.as_str()
    }

    /// The bound adapter.
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }
}

/// Resolves a framework choice into an [`ActiveBackend`].
pub struct BackendResolver {
    config: ResolverConfig,
    loader: AdapterLoader,
}

impl BackendResolver {
    /// Creates a resolver using the compiled-in adapters.
    pub fn new(config: ResolverConfig) -> Self {
        Self::with_loader(config, deeptime_backends::load)
    }

    /// Creates a resolver with a custom adapter loader.
    pub fn with_loader(config: ResolverConfig, loader: AdapterLoader) -> Self {
        Self { config, loader }
    }

    /// The resolver configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Reads and validates the configured framework, `None` if the key is absent.
    pub fn configured(
        &self,
        source: &dyn ConfigSource,
    ) -> Result<Option<Framework>, ConfigurationError> {
        let key = self.config.env_key.as_str();
        match source.lookup(key) {
            None => Ok(None),
            Some(value) => match Framework::from_identifier(&value) {
                Some(framework) => {
                    debug!(key, %framework, "framework configured");
                    Ok(Some(framework))
                }
                None => {
                    warn!(key, value = %value, "unsupported framework identifier");
                    Err(ConfigurationError::unsupported_framework(key, value))
                }
            },
        }
    }

    /// Reads and validates the framework choice, falling back to the default.
    pub fn select(&self, source: &dyn ConfigSource) -> Result<Framework, ConfigurationError> {
        match self.configured(source)? {
            Some(framework) => Ok(framework),
            None => {
                debug!(
                    key = self.config.env_key.as_str(),
                    default = %self.config.default_framework,
                    "framework not configured, using default"
                );
                Ok(self.config.default_framework)
            }
        }
    }

    /// Binds `requested` after checking it against the configured choice.
    ///
    /// An invalid configured value is still fatal, and a valid one that names
    /// a different framework is a conflict.
    pub fn resolve_requested(
        &self,
        source: &dyn ConfigSource,
        requested: Framework,
    ) -> Result<ActiveBackend, ConfigurationError> {
        if let Some(configured) = self.configured(source)? {
            if configured != requested {
                warn!(%configured, %requested, "requested framework conflicts with configuration");
                return Err(ConfigurationError::conflicting_framework(
                    self.config.env_key.as_str(),
                    configured,
                    requested,
                ));
            }
        }
        self.bind(requested)
    }

    /// Loads the adapter for an already validated framework.
    pub fn bind(&self, framework: Framework) -> Result<ActiveBackend, ConfigurationError> {
        let backend = (self.loader)(framework).ok_or_else(|| {
            warn!(%framework, "no adapter compiled in for framework");
            ConfigurationError::missing_adapter(framework)
        })?;
        if backend.framework() != framework {
            return Err(ConfigurationError::missing_adapter(framework));
        }

        info!(%framework, "computation backend resolved");
        Ok(ActiveBackend { framework, backend })
    }

    /// Selects and binds in one step.
    pub fn resolve(&self, source: &dyn ConfigSource) -> Result<ActiveBackend, ConfigurationError> {
        let framework = self.select(source)?;
        self.bind(framework)
    }
}

impl Default for BackendResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl fmt::Debug for BackendResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deeptime_core::{MapSource, ResolverConfigBuilder, FRAMEWORK_ENV_KEY};
    use pretty_assertions::assert_eq;

    fn no_adapters(_: Framework) -> Option<Box<dyn Backend>> {
        None
    }

    #[test]
    fn test_absent_key_selects_default() {
        let resolver = BackendResolver::default();
        let active = resolver.resolve(&MapSource::new()).unwrap();
        assert_eq!(active.framework(), Framework::TensorFlow);
        assert_eq!(active.name(), "tensorflow");
        assert_eq!(active.backend().name(), "tensorflow");
    }

    #[test]
    fn test_configured_default_is_honoured() {
        let config = ResolverConfigBuilder::new()
            .default_framework(Framework::PyTorch)
            .build();
        let resolver = BackendResolver::new(config);
        assert_eq!(resolver.select(&MapSource::new()), Ok(Framework::PyTorch));
    }

    #[test]
    fn test_custom_key() {
        let config = ResolverConfigBuilder::new().env_key("OTHER_KEY").build();
        let resolver = BackendResolver::new(config);
        let source = MapSource::new()
            .with(FRAMEWORK_ENV_KEY, "theano")
            .with("OTHER_KEY", "pytorch");
        assert_eq!(resolver.select(&source), Ok(Framework::PyTorch));
    }

    #[test]
    fn test_rejections() {
        let resolver = BackendResolver::default();
        for value in ["theano", "", "TensorFlow", "PyTorch", " tensorflow"] {
            let source = MapSource::new().with(FRAMEWORK_ENV_KEY, value);
            assert_eq!(
                resolver.resolve(&source).map(|a| a.framework()),
                Err(ConfigurationError::unsupported_framework(FRAMEWORK_ENV_KEY, value))
            );
        }
    }

    #[test]
    fn test_missing_adapter_is_distinct_from_unsupported() {
        let resolver = BackendResolver::with_loader(ResolverConfig::default(), no_adapters);

        let source = MapSource::new().with(FRAMEWORK_ENV_KEY, "pytorch");
        let err = resolver.resolve(&source).unwrap_err();
        assert_eq!(err, ConfigurationError::missing_adapter(Framework::PyTorch));
        assert!(err.is_internal());

        let source = MapSource::new().with(FRAMEWORK_ENV_KEY, "theano");
        let err = resolver.resolve(&source).unwrap_err();
        assert!(err.is_misconfiguration());
    }

    #[test]
    fn test_requested_framework_checks_configuration() {
        let resolver = BackendResolver::default();

        let active = resolver
            .resolve_requested(&MapSource::new(), Framework::PyTorch)
            .unwrap();
        assert_eq!(active.framework(), Framework::PyTorch);

        let source = MapSource::new().with(FRAMEWORK_ENV_KEY, "theano");
        assert_eq!(
            resolver
                .resolve_requested(&source, Framework::PyTorch)
                .map(|a| a.framework()),
            Err(ConfigurationError::unsupported_framework(FRAMEWORK_ENV_KEY, "theano"))
        );

        let source = MapSource::new().with(FRAMEWORK_ENV_KEY, "tensorflow");
        assert_eq!(
            resolver
                .resolve_requested(&source, Framework::PyTorch)
                .map(|a| a.framework()),
            Err(ConfigurationError::conflicting_framework(
                FRAMEWORK_ENV_KEY,
                Framework::TensorFlow,
                Framework::PyTorch
            ))
        );

        let source = MapSource::new().with(FRAMEWORK_ENV_KEY, "pytorch");
        assert!(resolver.resolve_requested(&source, Framework::PyTorch).is_ok());
    }

    #[test]
    fn test_debug_output() {
        let resolver = BackendResolver::default();
        assert!(format!("{resolver:?}").contains("DEEPTIME_FRAMEWORK"));
    }
}
