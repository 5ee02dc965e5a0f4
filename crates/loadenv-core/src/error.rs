//! Error types for LoadEnv.
//!
//! Every fallible operation in the workspace returns [`Result<T>`]. Gateway
//! failures are produced once, at the HTTP boundary, and then travel
//! unchanged through the client so callers can match on the same variant the
//! remote service caused.
//!
//! # Example
//!
//! ```
//! use loadenv_core::{LoadEnvError, Result};
//!
//! fn resolve_project(explicit: Option<&str>) -> Result<String> {
//!     explicit
//!         .map(str::to_string)
//!         .ok_or_else(|| LoadEnvError::configuration("no project id"))
//! }
//!
//! assert!(resolve_project(None).unwrap_err().is_configuration_error());
//! ```

use thiserror::Error;

/// Main error type for LoadEnv operations.
#[derive(Debug, Error)]
pub enum LoadEnvError {
    /// Local configuration is incomplete (e.g. no project could be resolved).
    /// Raised before any network call; never retried, never cached.
    #[error("Configuration error: {message}")]
    Configuration {
        /// What is missing or invalid
        message: String,
    },

    /// The remote service reports that the secret or path does not exist.
    #[error("Not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// The remote service rejected the credentials.
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Message reported by the remote service
        message: String,
    },

    /// The remote service could not be reached.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of what went wrong
        message: String,
        /// Underlying error
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The remote service answered with an unexpected status.
    #[error("Remote service returned status {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message reported by the remote service
        message: String,
    },

    /// The remote service answered with a body that could not be decoded.
    #[error("Invalid response from remote service: {message}")]
    InvalidResponse {
        /// Description of the decode failure
        message: String,
    },

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LoadEnvError {
    /// Creates a Configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a NotFound error.
    ///
    /// # Example
    ///
    /// ```
    /// use loadenv_core::LoadEnvError;
    ///
    /// let error = LoadEnvError::not_found("secret 'DATABASE_URL'");
    /// assert!(error.is_not_found());
    /// ```
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates an Authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates a Transport error without a cause.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a Transport error with a cause.
    pub fn transport_with_cause<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Creates an Api error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Creates an InvalidResponse error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Creates an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================
    // Query methods
    // ============================================

    /// Returns true if this is a locally raised configuration error.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Returns true if the remote service reported a missing resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if the credentials were rejected.
    pub fn is_authentication_error(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns true if the remote service could not be reached.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Type alias for Results with LoadEnvError.
pub type Result<T> = std::result::Result<T, LoadEnvError>;
