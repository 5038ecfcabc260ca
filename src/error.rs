//! Error types for the measurement client library
//!
//! All construction failures are surfaced synchronously from the creation
//! call. A failed creation means "measurement unavailable" for the calling
//! application; it is never fatal and nothing partially-initialized is ever
//! handed back to the caller.

use thiserror::Error;

use crate::client::backend::BackendError;

/// Result type for measurement client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the measurement client
///
/// Errors are `Clone` so they can be forwarded to registered delegates via
/// [`MeasurementEventHandler::on_client_error`](crate::events::MeasurementEventHandler::on_client_error)
/// in addition to being returned to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// No usable delegate was supplied to the factory
    ///
    /// Raised when a client is built without a delegate, or when the supplied
    /// weak delegate reference can no longer be upgraded at construction time.
    #[error("Invalid delegate: {reason}")]
    InvalidDelegate {
        /// Why the delegate was rejected
        reason: String,
    },

    /// Required process-wide configuration is absent
    #[error("Required configuration missing: {field}")]
    ConfigurationMissing {
        /// The configuration field (or store) that was absent
        field: String,
    },

    /// A configuration value is present but malformed
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What was wrong with the value
        reason: String,
    },

    /// The underlying measurement engine refused to initialize
    ///
    /// Propagated verbatim as a construction failure. No retry is attempted
    /// by the factory; retry policy, if any, belongs to the caller.
    #[error("Measurement engine initialization failed: {reason}")]
    InitializationFailed {
        /// The engine's failure reason
        reason: String,
    },

    /// A session operation was attempted in the wrong state
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Description of the state violation
        message: String,
    },

    /// The underlying measurement engine failed at runtime
    #[error("Measurement engine error: {0}")]
    Sdk(#[from] BackendError),

    /// Internal error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal failure
        message: String,
    },
}

impl ClientError {
    /// Create an invalid delegate error
    pub fn invalid_delegate(reason: impl Into<String>) -> Self {
        Self::InvalidDelegate {
            reason: reason.into(),
        }
    }

    /// Create a missing configuration error
    pub fn configuration_missing(field: impl Into<String>) -> Self {
        Self::ConfigurationMissing {
            field: field.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Create an initialization failure error
    pub fn initialization_failed(reason: impl Into<String>) -> Self {
        Self::InitializationFailed {
            reason: reason.into(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error was raised during client construction
    ///
    /// Construction errors mean no client was produced; the application
    /// should continue without measurement rather than treat this as fatal.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDelegate { .. }
                | Self::ConfigurationMissing { .. }
                | Self::InvalidConfiguration { .. }
                | Self::InitializationFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_helpers_produce_matching_variants() {
        assert!(matches!(
            ClientError::invalid_delegate("no delegate"),
            ClientError::InvalidDelegate { .. }
        ));
        assert!(matches!(
            ClientError::configuration_missing("app_id"),
            ClientError::ConfigurationMissing { .. }
        ));
        assert!(matches!(
            ClientError::initialization_failed("engine said no"),
            ClientError::InitializationFailed { .. }
        ));
    }

    #[test]
    fn construction_error_classification() {
        assert!(ClientError::invalid_delegate("x").is_construction_error());
        assert!(ClientError::configuration_missing("x").is_construction_error());
        assert!(ClientError::initialization_failed("x").is_construction_error());
        assert!(!ClientError::invalid_state("x").is_construction_error());
        assert!(!ClientError::internal("x").is_construction_error());
    }

    #[test]
    fn display_includes_detail() {
        let err = ClientError::configuration_missing("app_id");
        assert_eq!(err.to_string(), "Required configuration missing: app_id");
    }
}
