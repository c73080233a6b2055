//! Helper-process elevator.
//!
//! Runs the wrapped command as `<helper> <program> <args...>`, feeds stdin,
//! discards stdout and captures stderr for diagnostics. With a
//! [`TerminalGate`] attached, the gate is held while the helper runs so its
//! password prompt has the terminal to itself.
//!
//! # Exit status
//!
//! | Helper | Code | Meaning |
//! |--------|------|---------|
//! | pkexec | 0 | success |
//! | pkexec | 126 | authentication dialog dismissed |
//! | pkexec | 127 | not authorized / authentication failed |
//! | pkexec | other | wrapped command failed |
//! | sudo | 0 | success |
//! | sudo | non-zero, `tee:` on stderr | wrapped command failed |
//! | sudo | other non-zero | authentication failed |

use crate::terminal::TerminalGate;
use legion::elevation::{ElevatedCommand, ElevationError, ElevationMethod, Elevator};
use std::io::{self, Write};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// pkexec: user dismissed the authentication dialog.
const PKEXEC_DISMISSED: i32 = 126;

/// pkexec: not authorized or authentication failed.
const PKEXEC_NOT_AUTHORIZED: i32 = 127;

/// Elevator that shells out to `pkexec` or `sudo`.
#[derive(Debug, Clone)]
pub struct HelperElevator {
    method: ElevationMethod,
    terminal: Option<TerminalGate>,
}

impl HelperElevator {
    /// Create an elevator for `method`.
    pub fn new(method: ElevationMethod) -> Self {
        Self {
            method,
            terminal: None,
        }
    }

    /// Hold `gate` while each helper process runs.
    pub fn with_terminal_gate(mut self, gate: TerminalGate) -> Self {
        self.terminal = Some(gate);
        self
    }

    /// The strategy in use.
    pub fn method(&self) -> ElevationMethod {
        self.method
    }

    fn build(&self, command: &ElevatedCommand) -> Command {
        let mut cmd = Command::new(self.method.program());
        if self.method == ElevationMethod::Sudo {
            cmd.arg("--");
        }
        cmd.arg(command.program())
            .args(command.args())
            .stdin(if command.stdin().is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd
    }
}

impl Elevator for HelperElevator {
    fn name(&self) -> &'static str {
        self.method.program()
    }

    fn run_elevated(&self, command: &ElevatedCommand) -> Result<(), ElevationError> {
        info!("Requesting elevation via {}: {}", self.method, command);

        let _terminal = self.terminal.as_ref().map(|gate| {
            debug!("menu input paused for the {} prompt", self.method);
            gate.hold()
        });
        let mut child = self.build(command).spawn().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ElevationError::HelperMissing(self.method.program().to_string())
            } else {
                ElevationError::Spawn(e.to_string())
            }
        })?;

        if let (Some(input), Some(mut stdin)) = (command.stdin(), child.stdin.take()) {
            // A helper that exits early (cancelled prompt) closes the pipe.
            match stdin.write_all(input.as_bytes()) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    debug!("{} closed stdin before input was written", self.method);
                }
                Err(e) => return Err(ElevationError::Spawn(e.to_string())),
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| ElevationError::Spawn(e.to_string()))?;
        let stderr = String::from_utf8_lossy(&output.stderr);

        let result = interpret_exit(self.method, output.status.code(), &stderr);
        match &result {
            Ok(()) => debug!("{} completed: {}", self.method, command),
            Err(e) => warn!("{} failed: {}", self.method, e),
        }
        result
    }
}

/// Map a helper exit status to an elevation result.
///
/// `code` is `None` when the helper was terminated by a signal.
pub fn interpret_exit(
    method: ElevationMethod,
    code: Option<i32>,
    stderr: &str,
) -> Result<(), ElevationError> {
    let stderr = stderr.trim();
    let Some(code) = code else {
        return Err(ElevationError::Spawn(format!(
            "{method} terminated by signal"
        )));
    };

    match (method, code) {
        (_, 0) => Ok(()),
        (ElevationMethod::Polkit, PKEXEC_DISMISSED) => Err(ElevationError::Cancelled),
        (ElevationMethod::Polkit, PKEXEC_NOT_AUTHORIZED) => {
            Err(ElevationError::NotAuthorized(non_empty(stderr, "polkit refused")))
        }
        (ElevationMethod::Polkit, code) => Err(ElevationError::CommandFailed {
            code: Some(code),
            stderr: stderr.to_string(),
        }),
        (ElevationMethod::Sudo, code) if wrapped_command_failed(stderr) => {
            Err(ElevationError::CommandFailed {
                code: Some(code),
                stderr: stderr.to_string(),
            })
        }
        (ElevationMethod::Sudo, _) => Err(ElevationError::NotAuthorized(non_empty(
            stderr,
            "sudo authentication failed",
        ))),
    }
}

fn wrapped_command_failed(stderr: &str) -> bool {
    stderr.lines().any(|line| line.starts_with("tee:"))
}

fn non_empty(stderr: &str, fallback: &str) -> String {
    if stderr.is_empty() {
        fallback.to_string()
    } else {
        stderr.to_string()
    }
}
