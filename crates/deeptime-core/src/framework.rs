//! The closed set of supported computation frameworks.
//!
//! Raw identifier strings are parsed into [`Framework`] at the configuration
//! boundary. Matching is exact and case-sensitive; nothing is trimmed or
//! lowercased, so `"TensorFlow"` and `""` are both rejected.

use std::fmt;
use std::str::FromStr;

/// Identifiers of every supported framework, in declaration order.
pub static SUPPORTED_FRAMEWORKS: [&str; 2] = ["tensorflow", "pytorch"];

/// A supported computation framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Framework {
    /// TensorFlow
    TensorFlow,
    /// PyTorch
    PyTorch,
}

impl Framework {
    /// Every supported framework, ordered like [`SUPPORTED_FRAMEWORKS`].
    pub const ALL: [Framework; 2] = [Framework::TensorFlow, Framework::PyTorch];

    /// Framework used when no configuration value is present.
    pub const DEFAULT: Framework = Framework::TensorFlow;

    /// The identifier string of this framework.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TensorFlow => "tensorflow",
            Self::PyTorch => "pytorch",
        }
    }

    /// Parses an identifier, returning `None` for anything outside the set.
    pub fn from_identifier(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|fw| fw.as_str() == value)
    }
}

impl Default for Framework {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an identifier outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFramework(pub String);

impl fmt::Display for UnknownFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown framework identifier {:?}", self.0)
    }
}

impl std::error::Error for UnknownFramework {}

impl FromStr for Framework {
    type Err = UnknownFramework;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_identifier(s).ok_or_else(|| UnknownFramework(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn test_supported_set_is_consistent() {
        assert!(!SUPPORTED_FRAMEWORKS.is_empty());

        let unique: HashSet<_> = SUPPORTED_FRAMEWORKS.iter().collect();
        assert_eq!(unique.len(), SUPPORTED_FRAMEWORKS.len());

        let names: Vec<_> = Framework::ALL.iter().map(|fw| fw.as_str()).collect();
        assert_eq!(names, SUPPORTED_FRAMEWORKS.to_vec());
        assert!(!SUPPORTED_FRAMEWORKS.contains(&""));
    }

    #[test]
    fn test_default_is_tensorflow() {
        assert_eq!(Framework::DEFAULT, Framework::TensorFlow);
        assert!(Framework::ALL.contains(&Framework::DEFAULT));
        assert_eq!(Framework::default().as_str(), "tensorflow");
    }

    #[test]
    fn test_parse_exact_match() {
        assert_eq!("tensorflow".parse(), Ok(Framework::TensorFlow));
        assert_eq!("pytorch".parse(), Ok(Framework::PyTorch));

        for bad in ["", "TensorFlow", "PYTORCH", " pytorch", "pytorch ", "theano"] {
            assert_eq!(
                bad.parse::<Framework>(),
                Err(UnknownFramework(bad.to_string())),
                "{bad:?} must be rejected"
            );
        }
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for fw in Framework::ALL {
            assert_eq!(fw.to_string().parse::<Framework>(), Ok(fw));
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_uses_identifier() {
        let json = serde_json::to_string(&Framework::PyTorch).unwrap();
        assert_eq!(json, "\"pytorch\"");
        let fw: Framework = serde_json::from_str("\"tensorflow\"").unwrap();
        assert_eq!(fw, Framework::TensorFlow);
    }
}
