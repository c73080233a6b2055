//! Events delivered to the presentation loop.
//!
//! Background workers, the stdin reader, the refresh timer and the signal
//! handler all post into one channel, so the loop itself never blocks on
//! I/O or authentication.

use crate::controller::{StatusSnapshot, ToggleReport};
use legion::attribute::AttributeKind;

/// Presentation loop input.
#[derive(Debug, Clone)]
pub enum TrayEvent {
    /// User activated a menu entry.
    Activate(AttributeKind),
    /// User asked for a status refresh.
    Refresh,
    /// A background toggle finished.
    Completed(ToggleReport),
    /// A background refresh finished.
    Refreshed {
        /// Menu generation when the refresh was requested
        generation: u64,
        /// Values read
        snapshot: StatusSnapshot,
    },
    /// Exit requested (menu, EOF or signal).
    Quit,
}
