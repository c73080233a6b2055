//! Error types for attribute access and toggle operations.
//!
//! - `AttributeError` - Failures of the sysfs attribute store
//! - `ToggleError` - The condition surfaced at the controller boundary

use crate::attribute::{AttributeBinding, AttributeKind};
use crate::elevation::ElevationError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error types for sysfs attribute reads and writes.
#[derive(Debug, Error)]
pub enum AttributeError {
    /// Attribute file is absent (likely a different hardware model).
    #[error("{kind} attribute not found at {}", path.display())]
    NotFound {
        /// Attribute kind
        kind: AttributeKind,
        /// Attribute path
        path: PathBuf,
    },

    /// Process lacks the privileges to access the attribute.
    #[error("permission denied on {kind} attribute {}", path.display())]
    PermissionDenied {
        /// Attribute kind
        kind: AttributeKind,
        /// Attribute path
        path: PathBuf,
    },

    /// Token outside the binding's value domain.
    #[error("invalid value '{value}' for {kind} (expected one of {expected:?})")]
    InvalidValue {
        /// Attribute kind
        kind: AttributeKind,
        /// Offending token
        value: String,
        /// Permitted tokens
        expected: &'static [&'static str],
    },

    /// Any other I/O failure.
    #[error("I/O error on {kind} attribute {}: {source}", path.display())]
    Io {
        /// Attribute kind
        kind: AttributeKind,
        /// Attribute path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

impl AttributeError {
    /// Classify an I/O error raised while accessing `binding`.
    pub fn from_io(binding: &AttributeBinding, source: io::Error) -> Self {
        let kind = binding.kind();
        let path = binding.path().to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => AttributeError::NotFound { kind, path },
            io::ErrorKind::PermissionDenied => AttributeError::PermissionDenied { kind, path },
            _ => AttributeError::Io { kind, path, source },
        }
    }

    /// Invalid token for `binding`.
    pub fn invalid_value(binding: &AttributeBinding, value: impl Into<String>) -> Self {
        AttributeError::InvalidValue {
            kind: binding.kind(),
            value: value.into(),
            expected: binding.domain(),
        }
    }

    /// Attribute the error refers to.
    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeError::NotFound { kind, .. }
            | AttributeError::PermissionDenied { kind, .. }
            | AttributeError::InvalidValue { kind, .. }
            | AttributeError::Io { kind, .. } => *kind,
        }
    }

    /// Whether the failure is a missing privilege.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, AttributeError::PermissionDenied { .. })
    }
}

/// Failure condition surfaced by a toggle operation.
///
/// Every variant is recoverable: the presentation layer shows it and keeps
/// the last confirmed value on display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToggleError {
    /// Attribute path absent.
    #[error("attribute not found: {0}")]
    NotFound(String),

    /// Access denied without elevation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Value outside the binding's domain.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// Read or write I/O failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// Helper missing, authorization refused or prompt cancelled.
    #[error("elevation failed: {0}")]
    ElevationFailed(String),
}

impl From<AttributeError> for ToggleError {
    fn from(err: AttributeError) -> Self {
        let message = err.to_string();
        match err {
            AttributeError::NotFound { .. } => ToggleError::NotFound(message),
            AttributeError::PermissionDenied { .. } => ToggleError::PermissionDenied(message),
            AttributeError::InvalidValue { .. } => ToggleError::InvalidValue(message),
            AttributeError::Io { .. } => ToggleError::Io(message),
        }
    }
}

impl From<ElevationError> for ToggleError {
    fn from(err: ElevationError) -> Self {
        match err {
            // The helper ran; the wrapped write itself failed.
            ElevationError::CommandFailed { .. } => ToggleError::Io(err.to_string()),
            other => ToggleError::ElevationFailed(other.to_string()),
        }
    }
}
