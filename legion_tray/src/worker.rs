//! Background dispatch of toggle requests.
//!
//! Each request runs on its own thread because the elevation prompt may block
//! for as long as the user takes to answer it. At most one request per
//! attribute is in flight; a second one is refused with
//! [`DispatchError::Busy`] until the presentation loop has handled the first
//! report and called [`ToggleWorker::complete`].

use crate::controller::ToggleController;
use crate::events::TrayEvent;
use legion::attribute::AttributeKind;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use thiserror::Error;
use tracing::{debug, warn};

/// Error returned by [`ToggleWorker::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// A request for this attribute is still running.
    #[error("{0} toggle already in progress")]
    Busy(AttributeKind),

    /// The worker thread could not be started.
    #[error("failed to start worker thread: {0}")]
    Spawn(String),
}

/// Runs controller operations off the presentation thread.
pub struct ToggleWorker {
    controller: Arc<ToggleController>,
    events: Sender<TrayEvent>,
    in_flight: Arc<Mutex<[bool; 3]>>,
}

impl ToggleWorker {
    /// Create a worker posting results to `events`.
    pub fn new(controller: Arc<ToggleController>, events: Sender<TrayEvent>) -> Self {
        Self {
            controller,
            events,
            in_flight: Arc::new(Mutex::new([false; 3])),
        }
    }

    /// Whether a request for `kind` is running.
    pub fn is_busy(&self, kind: AttributeKind) -> bool {
        self.in_flight.lock()[kind.index()]
    }

    /// Start a toggle of `kind` in the background.
    ///
    /// The report arrives as `TrayEvent::Completed`. `kind` stays busy until
    /// the receiver calls [`complete`](Self::complete).
    ///
    /// # Errors
    /// `Busy` if a request for `kind` is already running, `Spawn` if the
    /// thread could not be created.
    pub fn dispatch(&self, kind: AttributeKind) -> Result<(), DispatchError> {
        {
            let mut in_flight = self.in_flight.lock();
            if in_flight[kind.index()] {
                return Err(DispatchError::Busy(kind));
            }
            in_flight[kind.index()] = true;
        }

        let controller = Arc::clone(&self.controller);
        let events = self.events.clone();
        let guard = InFlightGuard {
            kind,
            in_flight: Arc::clone(&self.in_flight),
            handed_off: false,
        };

        let spawned = thread::Builder::new()
            .name(format!("toggle-{kind}"))
            .spawn(move || {
                let report = controller.toggle(kind);
                if events.send(TrayEvent::Completed(report)).is_ok() {
                    guard.hand_off();
                } else {
                    debug!("{}: presentation loop gone, report dropped", kind);
                }
            });

        // A failed spawn drops the closure, and with it the guard.
        if let Err(e) = spawned {
            warn!("{}: failed to spawn worker: {}", kind, e);
            return Err(DispatchError::Spawn(e.to_string()));
        }
        debug!("{}: toggle dispatched", kind);
        Ok(())
    }

    /// Release `kind` after its `Completed` report has been handled.
    pub fn complete(&self, kind: AttributeKind) {
        self.in_flight.lock()[kind.index()] = false;
    }

    /// Read all attributes in the background.
    ///
    /// The snapshot arrives as `TrayEvent::Refreshed`, tagged with
    /// `generation` (see `TrayMenu::generation`).
    ///
    /// # Errors
    /// `Spawn` if the thread could not be created.
    pub fn refresh(&self, generation: u64) -> Result<(), DispatchError> {
        let controller = Arc::clone(&self.controller);
        let events = self.events.clone();
        thread::Builder::new()
            .name("status-refresh".to_string())
            .spawn(move || {
                let snapshot = controller.snapshot();
                let event = TrayEvent::Refreshed {
                    generation,
                    snapshot,
                };
                if events.send(event).is_err() {
                    debug!("presentation loop gone, snapshot dropped");
                }
            })
            .map(|_| ())
            .map_err(|e| DispatchError::Spawn(e.to_string()))
    }
}

/// Busy flag owned by a toggle thread until its report is posted.
///
/// Dropped without `hand_off` (panic, closed channel, failed spawn) it
/// releases the attribute itself.
struct InFlightGuard {
    kind: AttributeKind,
    in_flight: Arc<Mutex<[bool; 3]>>,
    handed_off: bool,
}

impl InFlightGuard {
    /// The receiver of the report now owns the flag.
    fn hand_off(mut self) {
        self.handed_off = true;
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.handed_off {
            return;
        }
        if thread::panicking() {
            warn!("{}: toggle panicked, releasing attribute", self.kind);
        }
        self.in_flight.lock()[self.kind.index()] = false;
    }
}
