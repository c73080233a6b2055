//! Terminal tray front-end.
//!
//! Single-threaded presentation loop over a [`TrayEvent`] channel. Menu
//! "clicks" come from stdin (`1`/`2`/`3` or an attribute name, `r` to
//! refresh, `q` to quit); toggles and refreshes run on the
//! [`ToggleWorker`] and come back as events.
//!
//! On a terminal the reader polls stdin and stays off it while a
//! [`TerminalGate`] is held, leaving password prompts to the helper.
//! Unrecognised input is never echoed to the log.

use crate::events::TrayEvent;
use crate::menu::{Notification, Severity, TrayMenu};
use crate::terminal::TerminalGate;
use crate::worker::{DispatchError, ToggleWorker};
use legion::attribute::AttributeKind;
use nix::errno::Errno;
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
use std::io::{self, BufRead, IsTerminal, Write};
use std::os::fd::AsFd;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Stdin poll interval in milliseconds.
const INPUT_POLL_MS: u16 = 100;

/// Whether the loop keeps running after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    /// Keep going.
    Continue,
    /// Leave the loop.
    Exit,
}

/// Parse one line of user input.
pub fn parse_command(line: &str) -> Option<TrayEvent> {
    let line = line.trim();
    match line {
        "" => None,
        "1" => Some(TrayEvent::Activate(AttributeKind::Conservation)),
        "2" => Some(TrayEvent::Activate(AttributeKind::FnLock)),
        "3" => Some(TrayEvent::Activate(AttributeKind::KeyboardLed)),
        "r" | "refresh" => Some(TrayEvent::Refresh),
        "q" | "quit" | "exit" => Some(TrayEvent::Quit),
        other => other.parse::<AttributeKind>().ok().map(TrayEvent::Activate),
    }
}

/// Forward stdin lines as events until EOF, then post `Quit`.
pub fn spawn_input_reader(
    events: Sender<TrayEvent>,
    gate: TerminalGate,
) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                read_terminal(&stdin, &events, &gate);
            } else {
                read_lines(stdin.lock(), &events);
            }
            if events.send(TrayEvent::Quit).is_err() {
                debug!("presentation loop gone before end of input");
            }
        })
}

/// Forward lines from non-interactive input until EOF.
pub fn read_lines<R: BufRead>(input: R, events: &Sender<TrayEvent>) {
    for line in input.lines() {
        let Ok(line) = line else { break };
        if !forward(&line, events) {
            return;
        }
    }
}

fn read_terminal(stdin: &io::Stdin, events: &Sender<TrayEvent>, gate: &TerminalGate) {
    let mut line = String::new();
    loop {
        match wait_for_line(stdin, gate) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                warn!("stdin poll failed: {}", e);
                return;
            }
        }

        // Canonical mode: a readable tty yields exactly one line.
        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => return,
            Ok(_) => {
                if !forward(&line, events) {
                    return;
                }
            }
            Err(e) => {
                warn!("stdin read failed: {}", e);
                return;
            }
        }
    }
}

/// Wait one poll interval for input. Never reports input while `gate` is held.
fn wait_for_line(stdin: &io::Stdin, gate: &TerminalGate) -> io::Result<bool> {
    if gate.is_held() {
        thread::sleep(Duration::from_millis(INPUT_POLL_MS.into()));
        return Ok(false);
    }

    let mut fds = [PollFd::new(stdin.as_fd(), PollFlags::POLLIN)];
    match poll(&mut fds, PollTimeout::from(INPUT_POLL_MS)) {
        Ok(0) => Ok(false),
        Ok(_) => Ok(!gate.is_held()),
        Err(Errno::EINTR) => Ok(false),
        Err(e) => Err(io::Error::from(e)),
    }
}

/// Post the event for `line`; `false` once the loop has gone away.
fn forward(line: &str, events: &Sender<TrayEvent>) -> bool {
    match parse_command(line) {
        Some(event) => events.send(event).is_ok(),
        None => {
            let len = line.trim().len();
            if len > 0 {
                warn!("Unrecognised menu input ignored ({} bytes)", len);
            }
            true
        }
    }
}

/// Presentation loop state.
pub struct TrayFrontend<W: Write> {
    menu: TrayMenu,
    worker: ToggleWorker,
    events: Receiver<TrayEvent>,
    refresh_interval: Duration,
    out: W,
}

impl<W: Write> TrayFrontend<W> {
    /// Create the front-end. `events` must be the receiving end of the
    /// channel the worker posts to.
    pub fn new(
        menu: TrayMenu,
        worker: ToggleWorker,
        events: Receiver<TrayEvent>,
        refresh_interval: Duration,
        out: W,
    ) -> Self {
        Self {
            menu,
            worker,
            events,
            refresh_interval,
            out,
        }
    }

    /// Menu model.
    pub fn menu(&self) -> &TrayMenu {
        &self.menu
    }

    /// Run until `Quit` or until every sender is gone.
    pub fn run(&mut self) -> io::Result<()> {
        info!("Tray loop started (refresh every {:?})", self.refresh_interval);
        self.request_refresh();
        self.render()?;

        let mut next_refresh = Instant::now() + self.refresh_interval;
        loop {
            let timeout = next_refresh.saturating_duration_since(Instant::now());
            let event = match self.events.recv_timeout(timeout) {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) => {
                    next_refresh = Instant::now() + self.refresh_interval;
                    TrayEvent::Refresh
                }
                Err(RecvTimeoutError::Disconnected) => break,
            };

            if self.process(event)? == LoopControl::Exit {
                break;
            }
        }

        info!("Tray loop stopped");
        Ok(())
    }

    /// Wait up to `timeout` for the next event.
    pub fn next_event(&self, timeout: Duration) -> Option<TrayEvent> {
        self.events.recv_timeout(timeout).ok()
    }

    /// Handle one event.
    pub fn process(&mut self, event: TrayEvent) -> io::Result<LoopControl> {
        match event {
            TrayEvent::Activate(kind) => match self.worker.dispatch(kind) {
                Ok(()) => {
                    self.menu.mark_pending(kind);
                    self.render()?;
                }
                Err(DispatchError::Busy(kind)) => {
                    debug!("{}: entry disabled, click ignored", kind);
                }
                Err(e) => {
                    warn!("{}", e);
                    writeln!(self.out, "[error] {}", e)?;
                }
            },
            TrayEvent::Refresh => self.request_refresh(),
            TrayEvent::Completed(report) => {
                self.worker.complete(report.kind);
                if let Some(notification) = self.menu.apply_report(&report) {
                    self.notify(&notification)?;
                }
                self.render()?;
            }
            TrayEvent::Refreshed {
                generation,
                snapshot,
            } => {
                let before = self.menu.entries().to_vec();
                self.menu.apply_snapshot(generation, &snapshot);
                if self.menu.entries() != before.as_slice() {
                    self.render()?;
                }
            }
            TrayEvent::Quit => return Ok(LoopControl::Exit),
        }
        Ok(LoopControl::Continue)
    }

    fn request_refresh(&self) {
        if let Err(e) = self.worker.refresh(self.menu.generation()) {
            warn!("Status refresh not started: {}", e);
        }
    }

    fn notify(&mut self, notification: &Notification) -> io::Result<()> {
        let tag = match notification.severity {
            Severity::Info => "notice",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        writeln!(
            self.out,
            "[{}] {}: {}",
            tag, notification.title, notification.message
        )
    }

    fn render(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        for (idx, entry) in self.menu.entries().iter().enumerate() {
            let busy = if entry.is_enabled() { "" } else { " (working...)" };
            writeln!(self.out, "  [{}] {}{}", idx + 1, entry.label(), busy)?;
        }
        writeln!(self.out, "  [r] Refresh Status   [q] Exit")?;
        self.out.flush()
    }
}
