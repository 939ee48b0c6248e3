//! Error types for octree configuration.

use std::fmt;

/// Result type for octree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when configuring an octree.
///
/// Building, updating and extracting never fail once their parameters have
/// been validated, so these only surface from constructors.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A numeric parameter is outside its valid domain.
    InvalidConfiguration {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Description of what was invalid.
        detail: String,
    },
    /// The requested depth would allow unbounded node allocation.
    ResourceLimitExceeded {
        /// The depth that was asked for.
        requested: u32,
        /// The largest depth that is accepted.
        limit: u32,
    },
}

impl Error {
    pub(crate) fn invalid(parameter: &'static str, detail: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            parameter,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfiguration { parameter, detail } => {
                write!(f, "invalid {parameter}: {detail}")
            }
            Error::ResourceLimitExceeded { requested, limit } => {
                write!(f, "max depth {requested} exceeds the supported limit of {limit}")
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_configuration() {
        let err = Error::invalid("edge length", "must be positive, got -1");
        assert_eq!(err.to_string(), "invalid edge length: must be positive, got -1");
    }

    #[test]
    fn test_display_resource_limit() {
        let err = Error::ResourceLimitExceeded {
            requested: 12,
            limit: 8,
        };
        assert_eq!(
            err.to_string(),
            "max depth 12 exceeds the supported limit of 8"
        );
    }
}
