//! # Transform Errors
//!
//! Error types for transform setup and the modal operation.
//!
//! ## Error Policy
//!
//! - User-level situations (nothing selected, a slide that cannot run) are
//!   resolved locally: the operation refuses to start or falls back to a
//!   simpler mode
//! - Errors are reserved for malformed input data and API misuse

use config::constants::ConfigError;
use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while building edit data or driving an operation.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Mesh connectivity cannot be represented.
    #[error("Invalid topology: {message}")]
    InvalidTopology {
        /// Description of the offending element
        message: String,
    },

    /// A handle does not address an element of the edit target.
    #[error("Invalid element: {message}")]
    InvalidElement {
        /// Description of the offending handle
        message: String,
    },

    /// The selection produced no transformable element.
    #[error("Nothing to transform")]
    NothingToTransform,

    /// A slide mode could not analyse the selection.
    #[error("Slide unavailable: {reason}")]
    SlideUnavailable {
        /// Why the selection cannot be slid
        reason: String,
    },

    /// The mode does not support the current edit target.
    #[error("Unsupported: {message}")]
    Unsupported {
        /// Description of the unsupported combination
        message: String,
    },

    /// The operation already reached a terminal state.
    #[error("Operation already finished")]
    OperationFinished,

    /// Invalid configuration values.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl TransformError {
    /// Creates an invalid topology error.
    pub fn invalid_topology(message: impl Into<String>) -> Self {
        Self::InvalidTopology {
            message: message.into(),
        }
    }

    /// Creates an invalid element error.
    pub fn invalid_element(message: impl Into<String>) -> Self {
        Self::InvalidElement {
            message: message.into(),
        }
    }

    /// Creates a slide precondition failure.
    pub fn slide_unavailable(reason: impl Into<String>) -> Self {
        Self::SlideUnavailable {
            reason: reason.into(),
        }
    }

    /// Creates an unsupported operation error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type TransformResult<T> = Result<T, TransformError>;
