//! Legion Common Library
//!
//! Shared types for the legion-tray workspace: the hardware attribute model,
//! the error taxonomy, the elevation contract and configuration loading.
//!
//! # Module Structure
//!
//! - [`attribute`] - Attribute kinds, typed values and sysfs bindings
//! - [`elevation`] - Elevated command model and the `Elevator` trait
//! - [`error`] - Store and controller error types
//! - [`config`] - Configuration loading traits and shared types
//! - [`tray_config`] - Application configuration sections
//! - [`consts`] - Default paths and timings
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! Add to your `Cargo.toml` with alias for shorter imports:
//! ```toml
//! [dependencies]
//! legion = { package = "legion_common", path = "../legion_common" }
//! ```

#![warn(missing_docs)]

pub mod attribute;
pub mod config;
pub mod consts;
pub mod elevation;
pub mod error;
pub mod prelude;
pub mod tray_config;
