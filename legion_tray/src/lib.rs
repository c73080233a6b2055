//! # Legion Tray Library
//!
//! Privileged state-toggle subsystem for Lenovo IdeaPad/Legion laptops:
//! battery conservation mode, FnLock and keyboard backlight, controlled
//! through the `ideapad_acpi` sysfs attributes.
//!
//! # Module Structure
//!
//! - [`store`] - sysfs attribute reads and writes
//! - [`elevators`] - `pkexec`/`sudo` strategies and startup selection
//! - [`state_machine`] - Per-attribute toggle lifecycle
//! - [`controller`] - Read → next → write → confirm orchestration
//! - [`worker`] - Background dispatch, one request per attribute
//! - [`events`] - Presentation loop events
//! - [`menu`] - Headless menu/tooltip/notification model
//! - [`frontend`] - Terminal presentation loop
//! - [`terminal`] - Terminal hand-off between the menu and password prompts
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  TrayEvent   ┌──────────────┐  spawn   ┌──────────────────┐
//! │ TrayFrontend │◄────────────►│ ToggleWorker │─────────►│ ToggleController │
//! │  (TrayMenu)  │   channel    └──────────────┘          └───┬──────────┬───┘
//! └──────────────┘                                            │          │
//!                                                             ▼          ▼
//!                                                 ┌────────────────┐ ┌──────────┐
//!                                                 │SysAttributeStore│ │ Elevator │
//!                                                 └────────────────┘ └──────────┘
//! ```

#![warn(missing_docs)]

pub mod controller;
pub mod elevators;
pub mod events;
pub mod frontend;
pub mod menu;
pub mod state_machine;
pub mod store;
pub mod terminal;
pub mod worker;

// Re-export key types for convenience
pub use crate::controller::{StatusSnapshot, ToggleController, ToggleOutcome, ToggleReport};
pub use crate::elevators::{HelperElevator, probe_elevator, select_method};
pub use crate::events::TrayEvent;
pub use crate::frontend::TrayFrontend;
pub use crate::menu::TrayMenu;
pub use crate::store::{AttributeStore, SysAttributeStore};
pub use crate::terminal::TerminalGate;
pub use crate::worker::{DispatchError, ToggleWorker};
