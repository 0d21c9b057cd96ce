//! Resolver configuration and configuration sources.
//!
//! The resolver reads exactly one string-valued key. Where that value comes
//! from is abstracted behind [`ConfigSource`] so the process environment can
//! be swapped for a fixed map in tests or by embedders.

use crate::framework::Framework;
use std::collections::HashMap;
use std::env;

/// Name of the environment variable that selects the backend.
pub const FRAMEWORK_ENV_KEY: &str = "DEEPTIME_FRAMEWORK";

/// Configuration for backend resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Key holding the framework identifier.
    pub env_key: String,
    /// Framework selected when the key is absent.
    pub default_framework: Framework,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            env_key: FRAMEWORK_ENV_KEY.to_string(),
            default_framework: Framework::DEFAULT,
        }
    }
}

/// Builder for creating a custom resolver configuration.
pub struct ResolverConfigBuilder {
    config: ResolverConfig,
}

impl ResolverConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ResolverConfig::default(),
        }
    }

    /// Set the key the framework identifier is read from.
    pub fn env_key<S: Into<String>>(mut self, key: S) -> Self {
        self.config.env_key = key.into();
        self
    }

    /// Set the fallback framework.
    pub fn default_framework(mut self, framework: Framework) -> Self {
        self.config.default_framework = framework;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ResolverConfig {
        self.config
    }
}

impl Default for ResolverConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A source of string-valued configuration.
pub trait ConfigSource {
    /// Returns the value stored under `key`, or `None` if the key is absent.
    ///
    /// A present but empty value must be returned as `Some("")`.
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Reads configuration from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn lookup(&self, key: &str) -> Option<String> {
        // Non-Unicode values are still "present"; they are converted lossily
        // and then fail validation like any other unknown identifier.
        env::var_os(key).map(|value| value.to_string_lossy().into_owned())
    }
}

/// Fixed in-memory configuration.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    values: HashMap<String, String>,
}

impl MapSource {
    /// Create an empty source, in which every key is absent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key/value pair.
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl<K, V> FromIterator<(K, V)> for MapSource
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ConfigSource for MapSource {
    fn lookup(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
