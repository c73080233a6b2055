//! sysfs attribute store.
//!
//! Reads and writes single-token values at attribute paths. [`AttributeStore`]
//! is the seam the controller writes through; [`SysAttributeStore`] keeps
//! no state: every read goes to the file, so concurrent external changes are
//! always observed.

use legion::attribute::{AttributeBinding, AttributeValue};
use legion::error::AttributeError;
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::{debug, trace};

/// Access to attribute files.
///
/// Implementors provide the raw I/O; parsing and domain checks are shared.
pub trait AttributeStore: Send + Sync {
    /// Whether the attribute file exists.
    fn exists(&self, binding: &AttributeBinding) -> bool;

    /// Read the trimmed token without domain validation.
    ///
    /// # Errors
    /// `NotFound`, `PermissionDenied` or `Io` depending on the failure.
    fn read_raw(&self, binding: &AttributeBinding) -> Result<String, AttributeError>;

    /// Write a raw token. The file must already exist.
    ///
    /// # Errors
    /// `InvalidValue` if the token is outside the domain, otherwise as
    /// `read_raw`.
    fn write_token(&self, binding: &AttributeBinding, token: &str) -> Result<(), AttributeError>;

    /// Read and parse the current value.
    ///
    /// # Errors
    /// As `read_raw`, plus `InvalidValue` if the token is outside the domain.
    fn read(&self, binding: &AttributeBinding) -> Result<AttributeValue, AttributeError> {
        let token = self.read_raw(binding)?;
        binding
            .parse(&token)
            .ok_or_else(|| AttributeError::invalid_value(binding, token))
    }

    /// Check that `value` may be written to `binding`.
    ///
    /// # Errors
    /// `InvalidValue` if the value belongs to another kind or its token is
    /// not in the binding's domain.
    fn validate(&self, binding: &AttributeBinding, value: AttributeValue) -> Result<(), AttributeError> {
        if !value.matches(binding.kind()) || !binding.accepts(value.token()) {
            return Err(AttributeError::invalid_value(binding, value.token()));
        }
        Ok(())
    }

    /// Write `value` directly.
    ///
    /// # Errors
    /// `InvalidValue` (checked before any I/O), `NotFound`,
    /// `PermissionDenied` when unprivileged, or `Io`.
    fn write(&self, binding: &AttributeBinding, value: AttributeValue) -> Result<(), AttributeError> {
        self.validate(binding, value)?;
        self.write_token(binding, value.token())
    }
}

/// Stateless accessor for sysfs attribute files.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysAttributeStore;

impl SysAttributeStore {
    /// Create a store.
    pub fn new() -> Self {
        Self
    }
}

impl AttributeStore for SysAttributeStore {
    fn exists(&self, binding: &AttributeBinding) -> bool {
        binding.path().is_file()
    }

    fn read_raw(&self, binding: &AttributeBinding) -> Result<String, AttributeError> {
        let content =
            fs::read_to_string(binding.path()).map_err(|e| AttributeError::from_io(binding, e))?;
        let token = content.trim().to_string();
        trace!("read {} = {:?}", binding.path().display(), token);
        Ok(token)
    }

    /// Opens with truncation and never creates the file.
    fn write_token(&self, binding: &AttributeBinding, token: &str) -> Result<(), AttributeError> {
        if !binding.accepts(token) {
            return Err(AttributeError::invalid_value(binding, token));
        }

        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(binding.path())
            .map_err(|e| AttributeError::from_io(binding, e))?;
        file.write_all(token.as_bytes())
            .map_err(|e| AttributeError::from_io(binding, e))?;

        debug!("wrote {} to {}", token, binding.path().display());
        Ok(())
    }
}
