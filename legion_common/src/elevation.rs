//! Privileged command model and elevator trait.
//!
//! This module defines:
//! - `ElevatedCommand` - A command to run with administrator rights
//! - `ElevationMethod` - The closed set of elevation strategies
//! - `ElevationChoice` - Configured preference (`auto` probes)
//! - `ElevationError` - Failure modes of an elevation attempt
//! - `Elevator` trait - Interface implemented by elevation strategies

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Program used to perform a privileged attribute write.
pub const WRITE_PROGRAM: &str = "tee";

/// A command executed through an elevation helper.
///
/// `program` and `args` are the wrapped command; the helper binary is
/// prepended by the strategy. `stdin` is fed to the child and closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElevatedCommand {
    program: String,
    args: Vec<String>,
    stdin: Option<String>,
}

impl ElevatedCommand {
    /// Arbitrary wrapped command.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
        }
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set stdin contents.
    pub fn with_stdin(mut self, stdin: impl Into<String>) -> Self {
        self.stdin = Some(stdin.into());
        self
    }

    /// `tee <path>` fed `token` on stdin.
    pub fn write_value(path: &Path, token: &str) -> Self {
        Self::new(WRITE_PROGRAM)
            .arg(path.to_string_lossy())
            .with_stdin(token)
    }

    /// Wrapped program.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Wrapped arguments.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Stdin contents, if any.
    pub fn stdin(&self) -> Option<&str> {
        self.stdin.as_deref()
    }

    /// Target path and token when this is a `write_value` command.
    pub fn write_target(&self) -> Option<(&Path, &str)> {
        if self.program != WRITE_PROGRAM || self.args.len() != 1 {
            return None;
        }
        Some((Path::new(&self.args[0]), self.stdin.as_deref().unwrap_or("")))
    }

    /// Single-line shell rendering, for logs and prompts.
    pub fn describe(&self) -> String {
        let mut line = String::new();
        if let Some(input) = &self.stdin {
            line.push_str("echo ");
            line.push_str(&shell_quote(input));
            line.push_str(" | ");
        }
        line.push_str(&shell_quote(&self.program));
        for arg in &self.args {
            line.push(' ');
            line.push_str(&shell_quote(arg));
        }
        line
    }
}

impl fmt::Display for ElevatedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | '='));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Elevation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElevationMethod {
    /// polkit `pkexec` (desktop authentication dialog).
    #[serde(rename = "pkexec")]
    Polkit,
    /// `sudo` (terminal credential prompt).
    Sudo,
}

impl ElevationMethod {
    /// Probe order: the desktop dialog first.
    pub const PROBE_ORDER: [ElevationMethod; 2] = [ElevationMethod::Polkit, ElevationMethod::Sudo];

    /// Helper binary name.
    pub const fn program(self) -> &'static str {
        match self {
            ElevationMethod::Polkit => "pkexec",
            ElevationMethod::Sudo => "sudo",
        }
    }
}

impl fmt::Display for ElevationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Configured elevation preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ElevationChoice {
    /// Probe `PATH` in `ElevationMethod::PROBE_ORDER`.
    #[default]
    Auto,
    /// Always use `pkexec`.
    Pkexec,
    /// Always use `sudo`.
    Sudo,
}

/// Failure modes of an elevation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElevationError {
    /// Helper binary could not be found.
    #[error("elevation helper '{0}' not found")]
    HelperMissing(String),

    /// User dismissed the authentication prompt.
    #[error("authentication cancelled by user")]
    Cancelled,

    /// Authentication failed or the policy refused the request.
    #[error("not authorized: {0}")]
    NotAuthorized(String),

    /// Helper authenticated but the wrapped command failed.
    #[error("elevated command failed (exit code {code:?}): {stderr}")]
    CommandFailed {
        /// Exit code, if the child exited normally
        code: Option<i32>,
        /// Captured stderr
        stderr: String,
    },

    /// Helper could not be started or waited on.
    #[error("failed to run elevation helper: {0}")]
    Spawn(String),
}

/// Interface for elevation strategies.
///
/// Implementations block until the helper exits, which may take as long as
/// the user needs to answer the prompt. No timeout is applied.
pub trait Elevator: Send + Sync {
    /// Strategy identifier (e.g., "pkexec", "sudo").
    fn name(&self) -> &'static str;

    /// Run `command` with administrator rights.
    ///
    /// # Errors
    /// Returns `ElevationError` on helper absence, cancellation, refusal or
    /// failure of the wrapped command. Callers must not assume any state
    /// change happened when an error is returned.
    fn run_elevated(&self, command: &ElevatedCommand) -> Result<(), ElevationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_value_targets_path() {
        let cmd = ElevatedCommand::write_value(Path::new("/sys/x/fn_lock"), "1");
        assert_eq!(cmd.program(), "tee");
        assert_eq!(cmd.args(), ["/sys/x/fn_lock".to_string()]);
        assert_eq!(cmd.stdin(), Some("1"));
        assert_eq!(cmd.write_target(), Some((Path::new("/sys/x/fn_lock"), "1")));
    }

    #[test]
    fn describe_quotes_special_characters() {
        let cmd = ElevatedCommand::write_value(
            Path::new("/sys/VPC2004:00/leds/platform::kbd_backlight/brightness"),
            "2",
        );
        assert_eq!(
            cmd.describe(),
            "echo 2 | tee '/sys/VPC2004:00/leds/platform::kbd_backlight/brightness'"
        );

        let cmd = ElevatedCommand::new("echo").arg("it's");
        assert_eq!(cmd.to_string(), r"echo 'it'\''s'");
    }

    #[test]
    fn non_write_commands_have_no_target() {
        let cmd = ElevatedCommand::new("true");
        assert!(cmd.write_target().is_none());
    }

    #[test]
    fn method_serde_names() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Wrapper {
            method: ElevationMethod,
            choice: ElevationChoice,
        }

        let parsed: Wrapper = toml::from_str("method = \"pkexec\"\nchoice = \"auto\"").unwrap();
        assert_eq!(
            parsed,
            Wrapper {
                method: ElevationMethod::Polkit,
                choice: ElevationChoice::Auto
            }
        );
        assert_eq!(ElevationMethod::PROBE_ORDER[0].program(), "pkexec");
        assert_eq!(ElevationMethod::Sudo.to_string(), "sudo");
    }
}
