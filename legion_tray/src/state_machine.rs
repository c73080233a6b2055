//! Per-attribute toggle lifecycle.
//!
//! `Idle → Reading → Writing → Confirming → Idle`. A failed read or write
//! short-circuits to `Idle`; confirming always ends in `Idle`. Each toggle
//! operation owns its own machine, so the three attributes never share
//! state.

use legion::attribute::AttributeKind;
use std::fmt;

/// Phase of one toggle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TogglePhase {
    /// No operation in progress.
    Idle,
    /// Reading the current value.
    Reading,
    /// Writing the next value.
    Writing,
    /// Re-reading to confirm the write.
    Confirming,
}

impl fmt::Display for TogglePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TogglePhase::Idle => "idle",
            TogglePhase::Reading => "reading",
            TogglePhase::Writing => "writing",
            TogglePhase::Confirming => "confirming",
        };
        f.write_str(name)
    }
}

/// Event driving a toggle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleEvent {
    /// User asked for a toggle.
    Request,
    /// Current value read.
    ReadSucceeded,
    /// Current value could not be read.
    ReadFailed,
    /// Write reported success.
    WriteSucceeded,
    /// Write or elevation failed.
    WriteFailed,
    /// Confirm-read finished, whatever its outcome.
    ConfirmFinished,
}

/// Result of a transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition succeeded, new phase.
    Ok(TogglePhase),
    /// Transition rejected, with reason.
    Rejected(&'static str),
}

/// Toggle state machine for one attribute.
#[derive(Debug, Clone)]
pub struct ToggleStateMachine {
    kind: AttributeKind,
    phase: TogglePhase,
}

impl ToggleStateMachine {
    /// New machine in `Idle`.
    pub const fn new(kind: AttributeKind) -> Self {
        Self {
            kind,
            phase: TogglePhase::Idle,
        }
    }

    /// Attribute this machine belongs to.
    #[inline]
    pub const fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// Current phase.
    #[inline]
    pub const fn phase(&self) -> TogglePhase {
        self.phase
    }

    /// Whether an operation is in progress.
    #[inline]
    pub const fn is_busy(&self) -> bool {
        !matches!(self.phase, TogglePhase::Idle)
    }

    /// Attempt a transition given an event.
    pub fn handle_event(&mut self, event: ToggleEvent) -> TransitionResult {
        use ToggleEvent::*;
        use TogglePhase::*;

        let next = match (self.phase, event) {
            (Idle, Request) => Reading,
            (Reading, ReadSucceeded) => Writing,
            (Reading, ReadFailed) => Idle,
            (Writing, WriteSucceeded) => Confirming,
            (Writing, WriteFailed) => Idle,
            (Confirming, ConfirmFinished) => Idle,
            _ => return TransitionResult::Rejected(invalid_transition_reason(self.phase, event)),
        };

        self.phase = next;
        TransitionResult::Ok(next)
    }
}

fn invalid_transition_reason(phase: TogglePhase, event: ToggleEvent) -> &'static str {
    use ToggleEvent::*;
    use TogglePhase::*;
    match (phase, event) {
        (_, Request) => "toggle already in progress",
        (Idle, _) => "Idle: only Request allowed",
        (Reading, _) => "Reading: only ReadSucceeded or ReadFailed allowed",
        (Writing, _) => "Writing: only WriteSucceeded or WriteFailed allowed",
        (Confirming, _) => "Confirming: only ConfirmFinished allowed",
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ToggleEvent::*;
    use TogglePhase::*;

    fn machine() -> ToggleStateMachine {
        ToggleStateMachine::new(AttributeKind::Conservation)
    }

    #[test]
    fn initial_phase_is_idle() {
        let sm = machine();
        assert_eq!(sm.phase(), Idle);
        assert!(!sm.is_busy());
        assert_eq!(sm.kind(), AttributeKind::Conservation);
    }

    #[test]
    fn full_cycle_returns_to_idle() {
        let mut sm = machine();
        assert_eq!(sm.handle_event(Request), TransitionResult::Ok(Reading));
        assert!(sm.is_busy());
        assert_eq!(sm.handle_event(ReadSucceeded), TransitionResult::Ok(Writing));
        assert_eq!(sm.handle_event(WriteSucceeded), TransitionResult::Ok(Confirming));
        assert_eq!(sm.handle_event(ConfirmFinished), TransitionResult::Ok(Idle));
    }

    #[test]
    fn read_failure_short_circuits() {
        let mut sm = machine();
        sm.handle_event(Request);
        assert_eq!(sm.handle_event(ReadFailed), TransitionResult::Ok(Idle));
    }

    #[test]
    fn write_failure_short_circuits() {
        let mut sm = machine();
        sm.handle_event(Request);
        sm.handle_event(ReadSucceeded);
        assert_eq!(sm.handle_event(WriteFailed), TransitionResult::Ok(Idle));
    }

    #[test]
    fn second_request_rejected_while_busy() {
        for phase in [Reading, Writing, Confirming] {
            let mut sm = ToggleStateMachine {
                kind: AttributeKind::FnLock,
                phase,
            };
            assert_eq!(
                sm.handle_event(Request),
                TransitionResult::Rejected("toggle already in progress"),
                "Request in {phase} must be rejected"
            );
            assert_eq!(sm.phase(), phase);
        }
    }

    #[test]
    fn out_of_order_events_rejected() {
        let mut sm = machine();
        assert!(matches!(
            sm.handle_event(WriteSucceeded),
            TransitionResult::Rejected(_)
        ));
        sm.handle_event(Request);
        assert!(matches!(
            sm.handle_event(ConfirmFinished),
            TransitionResult::Rejected(_)
        ));
        assert_eq!(sm.phase(), Reading);
    }
}
