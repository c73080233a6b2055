//! Controlling-terminal arbitration.
//!
//! The terminal front-end reads menu commands from stdin while the elevation
//! helpers (`sudo`, or `pkexec` without a desktop agent) prompt for a
//! password on the same tty. A [`TerminalGate`] is held for the lifetime of
//! every helper process and the input reader does not read while it is held,
//! so the typed password reaches the helper and nothing else.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared "a prompt owns the terminal" flag. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct TerminalGate {
    holders: Arc<AtomicUsize>,
}

impl TerminalGate {
    /// New, unheld gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the terminal until the returned hold is dropped.
    pub fn hold(&self) -> TerminalHold {
        self.holders.fetch_add(1, Ordering::SeqCst);
        TerminalHold {
            holders: Arc::clone(&self.holders),
        }
    }

    /// Whether any prompt currently owns the terminal.
    pub fn is_held(&self) -> bool {
        self.holders.load(Ordering::SeqCst) > 0
    }
}

/// Releases the gate on drop.
#[must_use = "the terminal is released as soon as the hold is dropped"]
#[derive(Debug)]
pub struct TerminalHold {
    holders: Arc<AtomicUsize>,
}

impl Drop for TerminalHold {
    fn drop(&mut self) {
        self.holders.fetch_sub(1, Ordering::SeqCst);
    }
}
