//! Toggle controller.
//!
//! Orchestrates read-current → compute-next → write → confirm-read for one
//! attribute per call. Values are never cached between calls; every toggle
//! starts from a fresh read. All failures end up in the returned
//! [`ToggleReport`], none escape as errors or panics.

use crate::state_machine::{ToggleEvent, TogglePhase, ToggleStateMachine, TransitionResult};
use crate::store::{AttributeStore, SysAttributeStore};
use legion::attribute::{AttributeBinding, AttributeKind, AttributeValue};
use legion::elevation::{ElevatedCommand, Elevator};
use legion::error::ToggleError;
use legion::tray_config::{TrayConfig, WritePolicy};
use tracing::{debug, info, warn};

/// Outcome of one toggle operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Written and confirmed.
    Applied {
        /// Confirmed value
        value: AttributeValue,
    },
    /// Written, but the confirm-read returned another value.
    Diverged {
        /// Value written
        requested: AttributeValue,
        /// Value read back
        observed: AttributeValue,
    },
    /// Written, but the confirm-read failed.
    Unconfirmed {
        /// Value written
        requested: AttributeValue,
        /// Confirm-read failure
        warning: ToggleError,
    },
    /// Read or write failed; nothing changed as far as we know.
    Failed {
        /// Failure condition
        error: ToggleError,
    },
}

/// Report delivered to the presentation layer after a toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleReport {
    /// Attribute toggled.
    pub kind: AttributeKind,
    /// Value read before writing, if the read succeeded.
    pub previous: Option<AttributeValue>,
    /// What happened.
    pub outcome: ToggleOutcome,
}

impl ToggleReport {
    fn failed(kind: AttributeKind, previous: Option<AttributeValue>, error: ToggleError) -> Self {
        Self {
            kind,
            previous,
            outcome: ToggleOutcome::Failed { error },
        }
    }

    /// Value the presentation should show, if it should change.
    ///
    /// `None` means keep whatever is displayed. An unconfirmed write keeps
    /// the value read before the operation.
    pub fn display_value(&self) -> Option<AttributeValue> {
        match &self.outcome {
            ToggleOutcome::Applied { value } => Some(*value),
            ToggleOutcome::Diverged { observed, .. } => Some(*observed),
            ToggleOutcome::Unconfirmed { .. } => self.previous,
            ToggleOutcome::Failed { .. } => None,
        }
    }

    /// Failure condition, if the toggle failed.
    pub fn error(&self) -> Option<&ToggleError> {
        match &self.outcome {
            ToggleOutcome::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// Whether the write was performed.
    pub fn is_written(&self) -> bool {
        !matches!(self.outcome, ToggleOutcome::Failed { .. })
    }
}

/// Fresh read of all attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    values: [Result<AttributeValue, ToggleError>; 3],
}

impl StatusSnapshot {
    /// Result for `kind`.
    pub fn get(&self, kind: AttributeKind) -> &Result<AttributeValue, ToggleError> {
        &self.values[kind.index()]
    }

    /// Iterate in menu order.
    pub fn iter(&self) -> impl Iterator<Item = (AttributeKind, &Result<AttributeValue, ToggleError>)> {
        AttributeKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.get(kind)))
    }
}

/// Toggle controller for the three attribute bindings.
pub struct ToggleController {
    bindings: [AttributeBinding; 3],
    store: Box<dyn AttributeStore>,
    elevator: Box<dyn Elevator>,
    policy: WritePolicy,
    privileged: bool,
}

impl ToggleController {
    /// Create a controller.
    ///
    /// `bindings` must be indexed by `AttributeKind::index`.
    pub fn new(
        bindings: [AttributeBinding; 3],
        elevator: Box<dyn Elevator>,
        policy: WritePolicy,
    ) -> Self {
        debug_assert!(
            AttributeKind::ALL
                .iter()
                .all(|kind| bindings[kind.index()].kind() == *kind),
            "bindings out of order"
        );
        let privileged = nix::unistd::geteuid().is_root();
        info!(
            "ToggleController created: elevator={}, policy={:?}, root={}",
            elevator.name(),
            policy,
            privileged
        );
        Self {
            bindings,
            store: Box::new(SysAttributeStore::new()),
            elevator,
            policy,
            privileged,
        }
    }

    /// Create a controller from configuration.
    pub fn from_config(config: &TrayConfig, elevator: Box<dyn Elevator>) -> Self {
        Self::new(config.bindings(), elevator, config.elevation.write_policy)
    }

    /// Override the effective-uid check (tests, privileged services).
    pub fn with_privileged(mut self, privileged: bool) -> Self {
        self.privileged = privileged;
        self
    }

    /// Replace the attribute store.
    pub fn with_store(mut self, store: impl AttributeStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    /// Binding for `kind`.
    pub fn binding(&self, kind: AttributeKind) -> &AttributeBinding {
        &self.bindings[kind.index()]
    }

    /// Name of the active elevator.
    pub fn elevator_name(&self) -> &'static str {
        self.elevator.name()
    }

    /// Attributes whose files are missing (likely another hardware model).
    pub fn missing_attributes(&self) -> Vec<AttributeKind> {
        AttributeKind::ALL
            .into_iter()
            .filter(|kind| !self.store.exists(self.binding(*kind)))
            .collect()
    }

    /// Read the current value of `kind`.
    pub fn read(&self, kind: AttributeKind) -> Result<AttributeValue, ToggleError> {
        self.store.read(self.binding(kind)).map_err(Into::into)
    }

    /// Read every attribute.
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            values: AttributeKind::ALL.map(|kind| self.read(kind)),
        }
    }

    /// Toggle `kind` to its next value.
    pub fn toggle(&self, kind: AttributeKind) -> ToggleReport {
        let binding = self.binding(kind);
        let mut machine = ToggleStateMachine::new(kind);
        advance(&mut machine, ToggleEvent::Request);

        let previous = match self.store.read(binding) {
            Ok(value) => {
                advance(&mut machine, ToggleEvent::ReadSucceeded);
                value
            }
            Err(e) => {
                advance(&mut machine, ToggleEvent::ReadFailed);
                warn!("{}: read failed: {}", kind, e);
                return ToggleReport::failed(kind, None, e.into());
            }
        };

        let requested = previous.next();
        info!("{}: {} -> {}", kind, previous, requested);

        if let Err(e) = self.write(binding, requested) {
            advance(&mut machine, ToggleEvent::WriteFailed);
            warn!("{}: write failed: {}", kind, e);
            return ToggleReport::failed(kind, Some(previous), e);
        }
        advance(&mut machine, ToggleEvent::WriteSucceeded);

        let outcome = match self.store.read(binding) {
            Ok(observed) if observed == requested => ToggleOutcome::Applied { value: observed },
            Ok(observed) => {
                warn!(
                    "{}: wrote {} but read back {}",
                    kind, requested, observed
                );
                ToggleOutcome::Diverged {
                    requested,
                    observed,
                }
            }
            Err(e) => {
                warn!("{}: confirm read failed: {}", kind, e);
                ToggleOutcome::Unconfirmed {
                    requested,
                    warning: e.into(),
                }
            }
        };
        advance(&mut machine, ToggleEvent::ConfirmFinished);
        debug_assert_eq!(machine.phase(), TogglePhase::Idle);

        ToggleReport {
            kind,
            previous: Some(previous),
            outcome,
        }
    }

    fn write(&self, binding: &AttributeBinding, value: AttributeValue) -> Result<(), ToggleError> {
        self.store.validate(binding, value)?;

        match self.policy {
            WritePolicy::Direct => self.store.write(binding, value).map_err(Into::into),
            WritePolicy::AlwaysElevate => self.elevated_write(binding, value),
            WritePolicy::Auto => match self.store.write(binding, value) {
                Err(e) if e.is_permission_denied() && !self.privileged => {
                    debug!("{}: direct write denied, elevating", binding.kind());
                    self.elevated_write(binding, value)
                }
                other => other.map_err(Into::into),
            },
        }
    }

    fn elevated_write(
        &self,
        binding: &AttributeBinding,
        value: AttributeValue,
    ) -> Result<(), ToggleError> {
        let command = ElevatedCommand::write_value(binding.path(), value.token());
        self.elevator.run_elevated(&command).map_err(Into::into)
    }
}

fn advance(machine: &mut ToggleStateMachine, event: ToggleEvent) {
    match machine.handle_event(event) {
        TransitionResult::Ok(phase) => debug!("{}: {:?} -> {}", machine.kind(), event, phase),
        TransitionResult::Rejected(reason) => {
            warn!("{}: {:?} rejected: {}", machine.kind(), event, reason)
        }
    }
}
