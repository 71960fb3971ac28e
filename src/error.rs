//! Error types for the expiring cache
//!
//! Only construction can fail. Lookups, misses and lost insert races are
//! reported through `Option`/`bool` return values, never through this type.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A configuration option failed validation
    #[error("Invalid configuration option `{option}`: {reason}")]
    InvalidConfig {
        /// Name of the offending option
        option: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// The background sweep scheduler could not be started
    #[error("Sweep scheduler error: {0}")]
    Scheduler(String),
}

impl CacheError {
    /// Shorthand for building an [`CacheError::InvalidConfig`].
    pub fn invalid_config(option: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            option,
            reason: reason.into(),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_names_option() {
        let err = CacheError::invalid_config("key_provider", "must be set");
        assert_eq!(
            err.to_string(),
            "Invalid configuration option `key_provider`: must be set"
        );
    }

    #[test]
    fn test_scheduler_error_display() {
        let err = CacheError::Scheduler("spawn failed".to_string());
        assert_eq!(err.to_string(), "Sweep scheduler error: spawn failed");
    }
}
