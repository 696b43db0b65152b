use crate::locator::UnknownFilterPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of cached selections per engine.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Engine configuration, usually loaded from a `docsel.toml`:
///
/// ```toml
/// [cache]
/// enabled = true
/// capacity = 256
///
/// [locator]
/// strict = false
/// unknown_filters = "reject"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub locator: LocatorConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.cache.enabled && self.cache.capacity == 0 {
            issues.push(ValidationIssue::InvalidValue {
                field: "cache.capacity",
                message: "must be at least 1 when the cache is enabled".to_string(),
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            capacity: default_capacity(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocatorConfig {
    /// Require paragraph and table locators to carry a value or filter.
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub unknown_filters: UnknownFilterPolicy,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::InvalidValue { field, message } => {
                write!(f, "invalid value for '{field}': {message}")
            }
        }
    }
}
