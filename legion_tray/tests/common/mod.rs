//! Shared fixtures: a fake `ideapad_acpi` tree under a temp dir and
//! in-process elevators.

#![allow(dead_code)]

use legion::attribute::{AttributeBinding, AttributeKind};
use legion::elevation::{ElevatedCommand, ElevationError, Elevator};
use legion::error::AttributeError;
use legion::tray_config::{PathsConfig, TrayConfig, WritePolicy};
use legion_tray::controller::ToggleController;
use legion_tray::store::{AttributeStore, SysAttributeStore};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ─── Fake sysfs ─────────────────────────────────────────────────────

/// Device directory with all three attribute files.
pub struct FakeDevice {
    pub dir: TempDir,
}

impl FakeDevice {
    /// Create the tree with initial contents (as the kernel shows them,
    /// newline-terminated).
    pub fn new(conservation: &str, fn_lock: &str, kbd: &str) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let device = Self { dir };
        fs::create_dir_all(
            device
                .path(AttributeKind::KeyboardLed)
                .parent()
                .expect("led dir"),
        )
        .expect("create led dir");
        device.set(AttributeKind::Conservation, conservation);
        device.set(AttributeKind::FnLock, fn_lock);
        device.set(AttributeKind::KeyboardLed, kbd);
        device
    }

    pub fn base(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, kind: AttributeKind) -> PathBuf {
        PathsConfig::under(self.base()).path_for(kind)
    }

    pub fn set(&self, kind: AttributeKind, raw: &str) {
        fs::write(self.path(kind), format!("{raw}\n")).expect("write attribute");
    }

    pub fn raw(&self, kind: AttributeKind) -> String {
        fs::read_to_string(self.path(kind)).expect("read attribute")
    }

    pub fn config(&self, policy: WritePolicy) -> TrayConfig {
        let mut config = TrayConfig {
            paths: PathsConfig::under(self.base()),
            ..TrayConfig::default()
        };
        config.elevation.write_policy = policy;
        config
    }

    /// Controller that always goes through `elevator`.
    pub fn controller(&self, elevator: impl Elevator + 'static) -> ToggleController {
        ToggleController::from_config(&self.config(WritePolicy::AlwaysElevate), Box::new(elevator))
            .with_privileged(false)
    }
}

// ─── Fake stores ───────────────────────────────────────────────────

/// Reads the real files but refuses every direct write with
/// `PermissionDenied`, whatever uid the tests run as.
pub struct WriteProtectedStore;

impl AttributeStore for WriteProtectedStore {
    fn exists(&self, binding: &AttributeBinding) -> bool {
        SysAttributeStore.exists(binding)
    }

    fn read_raw(&self, binding: &AttributeBinding) -> Result<String, AttributeError> {
        SysAttributeStore.read_raw(binding)
    }

    fn write_token(&self, binding: &AttributeBinding, _token: &str) -> Result<(), AttributeError> {
        Err(AttributeError::from_io(
            binding,
            io::Error::from(io::ErrorKind::PermissionDenied),
        ))
    }
}

// ─── Fake elevators ─────────────────────────────────────────────────

/// Performs the wrapped `tee` in-process and records every call.
#[derive(Clone, Default)]
pub struct RecordingElevator {
    calls: Arc<Mutex<Vec<(PathBuf, String)>>>,
}

impl RecordingElevator {
    pub fn calls(&self) -> Vec<(PathBuf, String)> {
        self.calls.lock().expect("calls").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls").len()
    }
}

impl Elevator for RecordingElevator {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn run_elevated(&self, command: &ElevatedCommand) -> Result<(), ElevationError> {
        let (path, token) = command
            .write_target()
            .ok_or_else(|| ElevationError::Spawn(format!("unexpected command: {command}")))?;
        fs::write(path, token).map_err(|e| ElevationError::CommandFailed {
            code: Some(1),
            stderr: format!("tee: {}: {}", path.display(), e),
        })?;
        self.calls
            .lock()
            .expect("calls")
            .push((path.to_path_buf(), token.to_string()));
        Ok(())
    }
}

/// Fails every request with a fixed error and counts attempts.
#[derive(Clone)]
pub struct FailingElevator {
    error: ElevationError,
    attempts: Arc<AtomicUsize>,
}

impl FailingElevator {
    pub fn new(error: ElevationError) -> Self {
        Self {
            error,
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn cancelled() -> Self {
        Self::new(ElevationError::Cancelled)
    }
}

impl Elevator for FailingElevator {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn run_elevated(&self, _command: &ElevatedCommand) -> Result<(), ElevationError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }
}

/// Writes a fixed token instead of the requested one (firmware clamping).
pub struct ClampingElevator {
    pub token: &'static str,
}

impl Elevator for ClampingElevator {
    fn name(&self) -> &'static str {
        "clamping"
    }

    fn run_elevated(&self, command: &ElevatedCommand) -> Result<(), ElevationError> {
        let (path, _) = command.write_target().ok_or(ElevationError::Cancelled)?;
        fs::write(path, self.token).map_err(|e| ElevationError::Spawn(e.to_string()))
    }
}

/// Writes, then removes the file so the confirm-read fails.
pub struct VanishingElevator;

impl Elevator for VanishingElevator {
    fn name(&self) -> &'static str {
        "vanishing"
    }

    fn run_elevated(&self, command: &ElevatedCommand) -> Result<(), ElevationError> {
        let (path, token) = command.write_target().ok_or(ElevationError::Cancelled)?;
        fs::write(path, token).map_err(|e| ElevationError::Spawn(e.to_string()))?;
        fs::remove_file(path).map_err(|e| ElevationError::Spawn(e.to_string()))
    }
}

/// Holds every request until the test releases it, then writes like
/// [`RecordingElevator`].
pub struct GatedElevator {
    gate: Mutex<Receiver<()>>,
    inner: RecordingElevator,
}

impl GatedElevator {
    /// Elevator plus the sender that releases one request per message.
    pub fn new(inner: RecordingElevator) -> (Self, Sender<()>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                gate: Mutex::new(rx),
                inner,
            },
            tx,
        )
    }
}

impl Elevator for GatedElevator {
    fn name(&self) -> &'static str {
        "gated"
    }

    fn run_elevated(&self, command: &ElevatedCommand) -> Result<(), ElevationError> {
        self.gate
            .lock()
            .expect("gate")
            .recv()
            .map_err(|_| ElevationError::Cancelled)?;
        self.inner.run_elevated(command)
    }
}

/// Panics inside the toggle thread.
pub struct PanickingElevator;

impl Elevator for PanickingElevator {
    fn name(&self) -> &'static str {
        "panicking"
    }

    fn run_elevated(&self, _command: &ElevatedCommand) -> Result<(), ElevationError> {
        panic!("elevator blew up");
    }
}
