//! Error types for chromasthesia-core.
//!
//! This module defines the central error type [`CoreError`] used throughout
//! the core crate, the [`CoreResult<T>`] alias, and [`BackendError`], the
//! uniform error every remote boundary trait returns.
//!
//! # Examples
//!
//! ```rust
//! use chromasthesia_core::error::BackendError;
//!
//! let err = BackendError::NotFound { resource: "photo 4451".to_string() };
//! assert!(err.is_benign());
//! assert!(!err.is_network());
//! ```

use thiserror::Error;

/// Top-level error type for core operations.
///
/// Covers local failure modes: validation of caller-supplied values,
/// configuration loading, serialization, and internal invariant violations.
/// Remote failures are [`BackendError`] instead.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A field value failed validation constraints.
    ///
    /// # When This Occurs
    ///
    /// - Color term weights summing above 1.0 (caller/configuration error)
    /// - Out-of-range settings values
    /// - NaN or Infinity in numeric fields
    #[error("Validation error: {field} - {message}")]
    Validation {
        /// Name of the field that failed validation
        field: String,
        /// Description of the validation failure
        message: String,
    },

    /// Configuration is invalid or missing.
    ///
    /// # When This Occurs
    ///
    /// - Missing or unreadable configuration file
    /// - Invalid configuration value format
    /// - Environment variable parsing failure
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error during serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An unexpected internal error occurred.
    ///
    /// These errors indicate bugs and should be reported, not retried.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Uniform error for the remote boundaries (classification, search,
/// size lookup, download).
///
/// The pipeline classifies these into benign ("the photo is gone, skip the
/// slot") versus fatal-for-the-item, so the variants keep HTTP-ish semantics
/// without naming any particular remote service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The referenced resource does not exist on the remote side.
    #[error("not found: {resource}")]
    NotFound {
        /// Human-readable description of the missing resource
        resource: String,
    },

    /// The remote side refused access to the resource.
    #[error("forbidden: {resource}")]
    Forbidden {
        /// Human-readable description of the refused resource
        resource: String,
    },

    /// Transport-level failure (connect, timeout, broken body).
    #[error("network error: {0}")]
    Network(String),

    /// The service answered, but with a failure.
    #[error("service error (status {status:?}): {message}")]
    Service {
        /// HTTP status code when one was received
        status: Option<u16>,
        /// Error message from the service
        message: String,
    },

    /// The response arrived but could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

impl BackendError {
    /// Whether this failure is the remote service's equivalent of "gone".
    ///
    /// Benign failures are recovered locally: the slot is skipped and the
    /// submission continues without surfacing an error.
    #[must_use]
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            BackendError::NotFound { .. } | BackendError::Forbidden { .. }
        )
    }

    /// Whether this failure happened below the service (transport).
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, BackendError::Network(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benign_classification() {
        let gone = BackendError::NotFound {
            resource: "photo 1".into(),
        };
        let refused = BackendError::Forbidden {
            resource: "photo 2".into(),
        };
        let net = BackendError::Network("connection reset".into());
        assert!(gone.is_benign());
        assert!(refused.is_benign());
        assert!(!net.is_benign());
        assert!(net.is_network());
    }

    #[test]
    fn test_core_error_display() {
        let err = CoreError::Validation {
            field: "terms".into(),
            message: "weight sum exceeds 1.0".into(),
        };
        assert!(err.to_string().contains("terms"));
        assert!(err.to_string().contains("1.0"));
    }

    #[test]
    fn test_service_error_display() {
        let err = BackendError::Service {
            status: Some(500),
            message: "boom".into(),
        };
        assert!(err.to_string().contains("500"));
    }
}
