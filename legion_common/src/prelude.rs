//! Prelude module for common re-exports.
//!
//! ```rust
//! use legion_common::prelude::*;
//! ```

// ─── Attributes ─────────────────────────────────────────────────────
pub use crate::attribute::{AttributeBinding, AttributeKind, AttributeValue, BacklightLevel};

// ─── Errors ─────────────────────────────────────────────────────────
pub use crate::error::{AttributeError, ToggleError};

// ─── Elevation ──────────────────────────────────────────────────────
pub use crate::elevation::{
    ElevatedCommand, ElevationChoice, ElevationError, ElevationMethod, Elevator,
};

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::tray_config::{TrayConfig, WritePolicy};
