//! Error types and result handling for generation pipelines and unique builders.

use crate::config::ConfigError;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, GenerateError>;

/// Errors raised while building or pulling from a generator pipeline
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerateError {
    /// An argument was rejected when the generator or builder was constructed
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A candidate collection had no elements to pick from
    #[error("Cannot pick from an empty collection")]
    EmptyCollection,

    /// A ranged generator was given a lower bound above its upper bound
    #[error("Invalid range: min {min} is greater than max {max}")]
    InvalidRange { min: String, max: String },

    /// A required name part was missing or blank
    #[error("Name part {index} is required but missing")]
    MissingNamePart { index: usize },

    /// A filter ran out of attempts before its predicate was satisfied
    #[error("Predicate not satisfied after {attempts} attempts")]
    PredicateNotSatisfied { attempts: usize },

    /// A finite uniqueness space has been fully consumed
    #[error("Capacity of {capacity} exhausted for {kind} (key: {key})")]
    CapacityExhausted {
        kind: &'static str,
        key: String,
        capacity: u64,
    },

    /// A produced value could not be converted to the requested type
    #[error("Invalid cast from {from} to {to}")]
    InvalidCast {
        from: &'static str,
        to: &'static str,
    },

    /// Configuration failed validation
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GenerateError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an invalid range error from any displayable bounds
    pub fn invalid_range(min: impl std::fmt::Display, max: impl std::fmt::Display) -> Self {
        Self::InvalidRange {
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    /// Create a capacity exhaustion error
    pub fn capacity_exhausted(kind: &'static str, key: impl Into<String>, capacity: u64) -> Self {
        Self::CapacityExhausted {
            kind,
            key: key.into(),
            capacity,
        }
    }

    /// Whether this error was caused by bad caller input rather than by a draw
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. }
                | Self::EmptyCollection
                | Self::InvalidRange { .. }
                | Self::MissingNamePart { .. }
                | Self::Config(_)
        )
    }

    /// Whether this error signals a consumed uniqueness space
    pub fn is_capacity_exhausted(&self) -> bool {
        matches!(self, Self::CapacityExhausted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = GenerateError::PredicateNotSatisfied { attempts: 10 };
        assert_eq!(
            format!("{}", error),
            "Predicate not satisfied after 10 attempts"
        );

        let error = GenerateError::invalid_range(5, 1);
        assert_eq!(
            format!("{}", error),
            "Invalid range: min 5 is greater than max 1"
        );

        let error = GenerateError::capacity_exhausted("numeric code", "global", 1000);
        assert_eq!(
            format!("{}", error),
            "Capacity of 1000 exhausted for numeric code (key: global)"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(GenerateError::EmptyCollection.is_input_error());
        assert!(GenerateError::MissingNamePart { index: 1 }.is_input_error());
        assert!(GenerateError::invalid_argument("count must be positive").is_input_error());
        assert!(!GenerateError::PredicateNotSatisfied { attempts: 3 }.is_input_error());

        let exhausted = GenerateError::capacity_exhausted("security number", "1990-01-01", 10_000);
        assert!(exhausted.is_capacity_exhausted());
        assert!(!exhausted.is_input_error());
    }

    #[test]
    fn test_config_error_conversion() {
        let error: GenerateError = ConfigError::InvalidFilterThreshold(0).into();
        assert!(error.is_input_error());
        assert_eq!(
            format!("{}", error),
            "Invalid filter threshold: 0 (must be > 0)"
        );
    }
}
