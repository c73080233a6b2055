//! Headless tray menu model.
//!
//! Holds, per attribute, the last value confirmed by a read and whether the
//! entry is enabled. An entry is disabled while its toggle is in flight and
//! re-enabled when the report arrives. Nothing here touches the hardware.
//!
//! Every dispatch and every report bumps the menu generation and stamps the
//! entry with it. A snapshot requested at an older generation than an
//! entry's stamp may predate that entry's write and is not applied to it.

use crate::controller::{StatusSnapshot, ToggleOutcome, ToggleReport};
use legion::attribute::{AttributeKind, AttributeValue};
use legion::consts::NOTIFICATION_TIMEOUT_MS;
use std::fmt::Write as _;
use tracing::{debug, warn};

/// Tooltip heading.
const TOOLTIP_TITLE: &str = "Lenovo Control";

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Setting changed.
    Info,
    /// Changed, but not confirmed as requested.
    Warning,
    /// Toggle failed.
    Error,
}

/// Notification emitted after a toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Title (attribute label).
    pub title: String,
    /// Body text.
    pub message: String,
    /// Severity.
    pub severity: Severity,
    /// Display duration hint.
    pub timeout_ms: u32,
}

impl Notification {
    fn new(kind: AttributeKind, message: String, severity: Severity) -> Self {
        Self {
            title: kind.label().to_string(),
            message,
            severity,
            timeout_ms: NOTIFICATION_TIMEOUT_MS,
        }
    }
}

/// One menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    kind: AttributeKind,
    value: Option<AttributeValue>,
    enabled: bool,
    loaded: bool,
    generation: u64,
}

impl MenuEntry {
    fn new(kind: AttributeKind) -> Self {
        Self {
            kind,
            value: None,
            enabled: true,
            loaded: false,
            generation: 0,
        }
    }

    /// Attribute.
    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// Last confirmed value.
    pub fn value(&self) -> Option<AttributeValue> {
        self.value
    }

    /// Whether the entry accepts clicks.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Menu text, e.g. `Conservation Mode: Enabled`.
    pub fn label(&self) -> String {
        let state = match (self.value, self.loaded) {
            (Some(value), _) => value.display_text(),
            (None, false) => "Loading...",
            (None, true) => "Unavailable",
        };
        format!("{}: {}", self.kind.label(), state)
    }
}

/// Menu model for the three attributes.
#[derive(Debug, Clone)]
pub struct TrayMenu {
    entries: [MenuEntry; 3],
    notifications: bool,
    generation: u64,
}

impl TrayMenu {
    /// New menu; every entry shows `Loading...`.
    pub fn new(notifications: bool) -> Self {
        Self {
            entries: AttributeKind::ALL.map(MenuEntry::new),
            notifications,
            generation: 0,
        }
    }

    /// Current generation; tag refresh requests with it.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn touch(&mut self, kind: AttributeKind) -> &mut MenuEntry {
        self.generation += 1;
        let entry = &mut self.entries[kind.index()];
        entry.generation = self.generation;
        entry
    }

    /// Entry for `kind`.
    pub fn entry(&self, kind: AttributeKind) -> &MenuEntry {
        &self.entries[kind.index()]
    }

    /// Entries in menu order.
    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// Disable `kind` while its toggle runs.
    pub fn mark_pending(&mut self, kind: AttributeKind) {
        self.touch(kind).enabled = false;
    }

    /// Apply a finished toggle: re-enable the entry, update the displayed
    /// value and build the notification (if enabled).
    pub fn apply_report(&mut self, report: &ToggleReport) -> Option<Notification> {
        let entry = self.touch(report.kind);
        entry.enabled = true;
        if let Some(value) = report.display_value() {
            entry.value = Some(value);
            entry.loaded = true;
        }

        let kind = report.kind;
        let notification = match &report.outcome {
            ToggleOutcome::Applied { value } => {
                Notification::new(kind, value.display_text().to_string(), Severity::Info)
            }
            ToggleOutcome::Diverged {
                requested,
                observed,
            } => Notification::new(
                kind,
                format!("Requested {requested}, hardware reports {observed}"),
                Severity::Warning,
            ),
            ToggleOutcome::Unconfirmed { requested, warning } => Notification::new(
                kind,
                format!("Set to {requested}, but could not confirm: {warning}"),
                Severity::Warning,
            ),
            ToggleOutcome::Failed { error } => {
                Notification::new(kind, format!("Failed: {error}"), Severity::Error)
            }
        };

        self.notifications.then_some(notification)
    }

    /// Apply a refresh requested at `generation`.
    ///
    /// Entries with a toggle in flight, or touched since the refresh was
    /// requested, are left alone; read failures keep the last confirmed
    /// value.
    pub fn apply_snapshot(&mut self, generation: u64, snapshot: &StatusSnapshot) {
        for (kind, result) in snapshot.iter() {
            let entry = &mut self.entries[kind.index()];
            if !entry.enabled {
                debug!("{}: refresh skipped, toggle in flight", kind);
                continue;
            }
            if entry.generation > generation {
                debug!(
                    "{}: stale refresh skipped (requested at {}, entry at {})",
                    kind, generation, entry.generation
                );
                continue;
            }
            entry.loaded = true;
            match result {
                Ok(value) => entry.value = Some(*value),
                Err(e) => warn!("{}: refresh failed: {}", kind, e),
            }
        }
    }

    /// Tooltip text.
    pub fn tooltip(&self) -> String {
        let mut text = String::from(TOOLTIP_TITLE);
        for entry in &self.entries {
            let state = entry.value.map(|v| v.short_text()).unwrap_or("?");
            let _ = write!(text, "\n{}: {}", entry.kind.short_label(), state);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use legion::attribute::BacklightLevel;
    use legion::error::ToggleError;

    fn applied(kind: AttributeKind, previous: AttributeValue) -> ToggleReport {
        ToggleReport {
            kind,
            previous: Some(previous),
            outcome: ToggleOutcome::Applied {
                value: previous.next(),
            },
        }
    }

    #[test]
    fn initial_labels_are_loading() {
        let menu = TrayMenu::new(true);
        assert_eq!(
            menu.entry(AttributeKind::Conservation).label(),
            "Conservation Mode: Loading..."
        );
        assert!(menu.entries().iter().all(MenuEntry::is_enabled));
        assert_eq!(menu.tooltip(), "Lenovo Control\nConservation: ?\nFnLock: ?\nKBD LEDs: ?");
    }

    #[test]
    fn pending_entry_reenabled_by_report() {
        let mut menu = TrayMenu::new(true);
        menu.mark_pending(AttributeKind::FnLock);
        assert!(!menu.entry(AttributeKind::FnLock).is_enabled());

        let note = menu
            .apply_report(&applied(AttributeKind::FnLock, AttributeValue::Switch(false)))
            .expect("notification");
        let entry = menu.entry(AttributeKind::FnLock);
        assert!(entry.is_enabled());
        assert_eq!(entry.label(), "FnLock: Enabled");
        assert_eq!(note.title, "FnLock");
        assert_eq!(note.message, "Enabled");
        assert_eq!(note.severity, Severity::Info);
    }

    #[test]
    fn failed_report_keeps_displayed_value() {
        let mut menu = TrayMenu::new(true);
        menu.apply_report(&applied(
            AttributeKind::KeyboardLed,
            AttributeValue::Backlight(BacklightLevel::Off),
        ));
        menu.mark_pending(AttributeKind::KeyboardLed);

        let note = menu
            .apply_report(&ToggleReport {
                kind: AttributeKind::KeyboardLed,
                previous: Some(AttributeValue::Backlight(BacklightLevel::Min)),
                outcome: ToggleOutcome::Failed {
                    error: ToggleError::ElevationFailed("authentication cancelled by user".into()),
                },
            })
            .unwrap();
        assert_eq!(
            menu.entry(AttributeKind::KeyboardLed).label(),
            "Keyboard LEDs: Min"
        );
        assert!(menu.entry(AttributeKind::KeyboardLed).is_enabled());
        assert_eq!(note.severity, Severity::Error);
        assert!(note.message.contains("cancelled"));
    }

    #[test]
    fn dispatch_and_report_advance_generation() {
        let mut menu = TrayMenu::new(true);
        assert_eq!(menu.generation(), 0);

        menu.mark_pending(AttributeKind::Conservation);
        assert_eq!(menu.generation(), 1);
        menu.apply_report(&applied(AttributeKind::Conservation, AttributeValue::Switch(false)));
        assert_eq!(menu.generation(), 2);
        assert_eq!(menu.entry(AttributeKind::Conservation).generation, 2);
        assert_eq!(menu.entry(AttributeKind::FnLock).generation, 0);
    }

    #[test]
    fn notifications_can_be_disabled() {
        let mut menu = TrayMenu::new(false);
        let note = menu.apply_report(&applied(
            AttributeKind::Conservation,
            AttributeValue::Switch(true),
        ));
        assert!(note.is_none());
        assert_eq!(
            menu.entry(AttributeKind::Conservation).value(),
            Some(AttributeValue::Switch(false))
        );
    }

    #[test]
    fn tooltip_lists_short_states() {
        let mut menu = TrayMenu::new(true);
        menu.apply_report(&applied(AttributeKind::Conservation, AttributeValue::Switch(false)));
        menu.apply_report(&applied(AttributeKind::FnLock, AttributeValue::Switch(true)));
        menu.apply_report(&applied(
            AttributeKind::KeyboardLed,
            AttributeValue::Backlight(BacklightLevel::Min),
        ));
        assert_eq!(
            menu.tooltip(),
            "Lenovo Control\nConservation: On\nFnLock: Off\nKBD LEDs: Max"
        );
    }
}
