// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for qubit-network construction, evaluation and training.

use std::fmt;

/// Result type alias for network operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Network error types.
#[derive(Debug)]
pub enum Error {
    /// Configuration error
    Config(String),
    /// Structured validation error (also a configuration error)
    Validation(ValidationError),
    /// Fidelity or training data requested without a target gate
    MissingTarget,
    /// Recognized but unimplemented path
    Unsupported(String),
    /// Numerical failure (singular Padé denominator, non-finite values)
    Numerical(String),
    /// IO error
    Io(std::io::Error),
    /// Serialization error
    Serialization(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Validation(e) => write!(f, "Validation error: {}", e),
            Error::MissingTarget => write!(f, "No target gate has been specified"),
            Error::Unsupported(msg) => write!(f, "Unsupported operation: {}", msg),
            Error::Numerical(msg) => write!(f, "Numerical error: {}", msg),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl Error {
    /// True for errors raised while checking a configuration
    /// (`Config` and `Validation`).
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Config(_) | Error::Validation(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Validation errors.
#[derive(Debug)]
pub enum ValidationError {
    /// Field validation failed
    Field { field: String, message: String },
    /// Two sizes that must agree do not
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },
    /// Parameter label not present in the symbol table
    UnknownLabel(String),
    /// Requested size exceeds a supported limit
    ResourceLimit {
        resource: String,
        limit: u64,
        requested: u64,
    },
    /// Physics constraint violated
    PhysicsConstraint(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Field { field, message } => {
                write!(f, "Field '{}': {}", field, message)
            }
            ValidationError::DimensionMismatch {
                what,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Dimension mismatch for {}: expected {}, got {}",
                    what, expected, actual
                )
            }
            ValidationError::UnknownLabel(label) => {
                write!(f, "Label '{}' does not match any parameter of the model", label)
            }
            ValidationError::ResourceLimit {
                resource,
                limit,
                requested,
            } => {
                write!(
                    f,
                    "Resource limit exceeded for {}: requested {}, limit {}",
                    resource, requested, limit
                )
            }
            ValidationError::PhysicsConstraint(msg) => {
                write!(f, "Physics constraint violated: {}", msg)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
