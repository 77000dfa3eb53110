//! Layout error types
//!
//! A single cloneable error enum covers every failure the layout core can
//! surface. Initialization errors are delivered to every waiter of an attempt,
//! so the type must be `Clone`.

use std::fmt;

// ============================================================================
// Error Categories
// ============================================================================

/// High-level classification used by hosts to decide how to react to an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Caller supplied an invalid value (correctable by the caller)
    Input,
    /// Layout configuration could not be read or validated
    Config,
    /// The setup routine failed
    Operation,
    /// A wait or an attempt was cancelled
    Cancelled,
}

impl ErrorCategory {
    /// Whether calling the operation again may succeed without changing input.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Operation | Self::Cancelled)
    }

    /// Short label for this category.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Config => "Config",
            Self::Operation => "Operation",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// LayoutError
// ============================================================================

/// Unified error type for layout operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// A required argument was absent or violated an input invariant
    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Name of the offending argument
        name: String,
        /// What was wrong with it
        reason: String,
    },

    /// The setup routine of an initialization attempt failed
    #[error("Initialization failed: {message}")]
    Initialization {
        /// Error message reported by the setup routine
        message: String,
    },

    /// The wait (or the setup routine itself) was cancelled
    #[error("Cancelled: {message}")]
    Cancelled {
        /// What was cancelled
        message: String,
    },

    /// Layout configuration could not be loaded
    #[error("Config error: {message}")]
    Config {
        /// Error message describing the configuration problem
        message: String,
    },
}

impl LayoutError {
    /// Create an invalid argument error
    pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an initialization error
    pub fn initialization(message: impl Into<String>) -> Self {
        Self::Initialization {
            message: message.into(),
        }
    }

    /// Create a cancellation error
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::Cancelled {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Category of this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidArgument { .. } => ErrorCategory::Input,
            Self::Initialization { .. } => ErrorCategory::Operation,
            Self::Cancelled { .. } => ErrorCategory::Cancelled,
            Self::Config { .. } => ErrorCategory::Config,
        }
    }

    /// Whether this error is a cancellation.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Result alias for layout operations
pub type LayoutResult<T> = Result<T, LayoutError>;

// ============================================================================
// StoreError
// ============================================================================

/// Failure reported by a preference store.
///
/// Store errors are consumed by the preference layer and never reach the
/// layout record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Underlying I/O failed
    #[error("Store I/O error: {message}")]
    Io {
        /// Error message from the I/O layer
        message: String,
    },

    /// Stored data could not be encoded or decoded
    #[error("Store serialization error: {message}")]
    Serialization {
        /// Error message from the codec
        message: String,
    },

    /// The backing store is not reachable right now
    #[error("Store unavailable: {message}")]
    Unavailable {
        /// Why the store is unavailable
        message: String,
    },
}

impl StoreError {
    /// Create an I/O error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}
