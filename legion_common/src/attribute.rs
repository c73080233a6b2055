//! Hardware attribute model.
//!
//! This module defines:
//! - `AttributeKind` - The three controllable settings
//! - `BacklightLevel` - Ordered keyboard backlight ring
//! - `AttributeValue` - Typed value of one attribute
//! - `AttributeBinding` - An attribute kind bound to its sysfs path and value domain

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Value domain of the boolean switches (`conservation_mode`, `fn_lock`).
pub const SWITCH_DOMAIN: &[&str] = &["0", "1"];

/// Value domain of the keyboard backlight (`Off`, `Min`, `Max`).
pub const BACKLIGHT_DOMAIN: &[&str] = &["0", "1", "2"];

/// Controllable hardware setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    /// Battery conservation mode (charge capped around 60%).
    Conservation,
    /// Function-key lock.
    FnLock,
    /// Keyboard backlight level.
    KeyboardLed,
}

impl AttributeKind {
    /// All kinds in menu order.
    pub const ALL: [AttributeKind; 3] = [
        AttributeKind::Conservation,
        AttributeKind::FnLock,
        AttributeKind::KeyboardLed,
    ];

    /// Stable index in `ALL`, usable for fixed-size per-kind tables.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            AttributeKind::Conservation => 0,
            AttributeKind::FnLock => 1,
            AttributeKind::KeyboardLed => 2,
        }
    }

    /// Permitted textual tokens for this kind.
    pub const fn domain(self) -> &'static [&'static str] {
        match self {
            AttributeKind::Conservation | AttributeKind::FnLock => SWITCH_DOMAIN,
            AttributeKind::KeyboardLed => BACKLIGHT_DOMAIN,
        }
    }

    /// Menu label.
    pub const fn label(self) -> &'static str {
        match self {
            AttributeKind::Conservation => "Conservation Mode",
            AttributeKind::FnLock => "FnLock",
            AttributeKind::KeyboardLed => "Keyboard LEDs",
        }
    }

    /// Compact label used in the tooltip.
    pub const fn short_label(self) -> &'static str {
        match self {
            AttributeKind::Conservation => "Conservation",
            AttributeKind::FnLock => "FnLock",
            AttributeKind::KeyboardLed => "KBD LEDs",
        }
    }

    /// Command-line name.
    pub const fn cli_name(self) -> &'static str {
        match self {
            AttributeKind::Conservation => "conservation",
            AttributeKind::FnLock => "fn-lock",
            AttributeKind::KeyboardLed => "kbd-led",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cli_name())
    }
}

/// Error returned when parsing an unknown attribute name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown attribute '{0}' (expected conservation, fn-lock or kbd-led)")]
pub struct UnknownAttribute(pub String);

impl FromStr for AttributeKind {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservation" | "conservation-mode" | "conservation_mode" => {
                Ok(AttributeKind::Conservation)
            }
            "fn-lock" | "fnlock" | "fn_lock" => Ok(AttributeKind::FnLock),
            "kbd-led" | "keyboard-led" | "keyboard_led" | "kbd-backlight" => {
                Ok(AttributeKind::KeyboardLed)
            }
            other => Err(UnknownAttribute(other.to_string())),
        }
    }
}

/// Keyboard backlight level, an ordered ring `Off → Min → Max → Off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BacklightLevel {
    /// Backlight disabled (`0`).
    Off,
    /// Dim (`1`).
    Min,
    /// Full brightness (`2`).
    Max,
}

impl BacklightLevel {
    /// Next level in the ring. `Max` wraps to `Off`.
    pub const fn successor(self) -> Self {
        match self {
            BacklightLevel::Off => BacklightLevel::Min,
            BacklightLevel::Min => BacklightLevel::Max,
            BacklightLevel::Max => BacklightLevel::Off,
        }
    }

    /// sysfs token.
    pub const fn token(self) -> &'static str {
        match self {
            BacklightLevel::Off => "0",
            BacklightLevel::Min => "1",
            BacklightLevel::Max => "2",
        }
    }

    /// Parse a sysfs token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "0" => Some(BacklightLevel::Off),
            "1" => Some(BacklightLevel::Min),
            "2" => Some(BacklightLevel::Max),
            _ => None,
        }
    }

    /// Display text.
    pub const fn label(self) -> &'static str {
        match self {
            BacklightLevel::Off => "Off",
            BacklightLevel::Min => "Min",
            BacklightLevel::Max => "Max",
        }
    }
}

/// Typed value of one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeValue {
    /// Boolean switch (conservation mode, FnLock).
    Switch(bool),
    /// Keyboard backlight level.
    Backlight(BacklightLevel),
}

impl AttributeValue {
    /// Parse a trimmed token for the given kind. Returns `None` outside the domain.
    pub fn from_token(kind: AttributeKind, token: &str) -> Option<Self> {
        match kind {
            AttributeKind::Conservation | AttributeKind::FnLock => match token {
                "0" => Some(AttributeValue::Switch(false)),
                "1" => Some(AttributeValue::Switch(true)),
                _ => None,
            },
            AttributeKind::KeyboardLed => {
                BacklightLevel::from_token(token).map(AttributeValue::Backlight)
            }
        }
    }

    /// sysfs token for this value.
    pub const fn token(self) -> &'static str {
        match self {
            AttributeValue::Switch(false) => "0",
            AttributeValue::Switch(true) => "1",
            AttributeValue::Backlight(level) => level.token(),
        }
    }

    /// Next value: boolean complement for switches, ring successor for the backlight.
    pub const fn next(self) -> Self {
        match self {
            AttributeValue::Switch(on) => AttributeValue::Switch(!on),
            AttributeValue::Backlight(level) => AttributeValue::Backlight(level.successor()),
        }
    }

    /// Whether this value belongs to `kind`.
    pub const fn matches(self, kind: AttributeKind) -> bool {
        matches!(
            (self, kind),
            (
                AttributeValue::Switch(_),
                AttributeKind::Conservation | AttributeKind::FnLock
            ) | (AttributeValue::Backlight(_), AttributeKind::KeyboardLed)
        )
    }

    /// Menu text (`Enabled`/`Disabled`, `Off`/`Min`/`Max`).
    pub const fn display_text(self) -> &'static str {
        match self {
            AttributeValue::Switch(true) => "Enabled",
            AttributeValue::Switch(false) => "Disabled",
            AttributeValue::Backlight(level) => level.label(),
        }
    }

    /// Tooltip text (`On`/`Off`, `Off`/`Min`/`Max`).
    pub const fn short_text(self) -> &'static str {
        match self {
            AttributeValue::Switch(true) => "On",
            AttributeValue::Switch(false) => "Off",
            AttributeValue::Backlight(level) => level.label(),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_text())
    }
}

/// An attribute kind bound to its sysfs file and value domain.
///
/// Built once at startup and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeBinding {
    kind: AttributeKind,
    path: PathBuf,
    domain: &'static [&'static str],
}

impl AttributeBinding {
    /// Bind `kind` to `path`. The domain follows from the kind.
    pub fn new(kind: AttributeKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
            domain: kind.domain(),
        }
    }

    /// Attribute kind.
    #[inline]
    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// sysfs file path.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Permitted tokens.
    #[inline]
    pub fn domain(&self) -> &'static [&'static str] {
        self.domain
    }

    /// Whether `token` is in the domain.
    pub fn accepts(&self, token: &str) -> bool {
        self.domain.contains(&token)
    }

    /// Parse raw file contents (trailing whitespace ignored).
    pub fn parse(&self, raw: &str) -> Option<AttributeValue> {
        let token = raw.trim();
        if !self.accepts(token) {
            return None;
        }
        AttributeValue::from_token(self.kind, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backlight_ring_order() {
        let mut level = BacklightLevel::Off;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(level);
            level = level.successor();
        }
        assert_eq!(
            seen,
            vec![
                BacklightLevel::Off,
                BacklightLevel::Min,
                BacklightLevel::Max,
                BacklightLevel::Off
            ]
        );
    }

    #[test]
    fn switch_next_is_complement() {
        assert_eq!(AttributeValue::Switch(false).next(), AttributeValue::Switch(true));
        assert_eq!(AttributeValue::Switch(true).next(), AttributeValue::Switch(false));
        assert_eq!(
            AttributeValue::Switch(true).next().next(),
            AttributeValue::Switch(true)
        );
    }

    #[test]
    fn tokens_stay_in_domain() {
        for kind in AttributeKind::ALL {
            for token in kind.domain() {
                let value = AttributeValue::from_token(kind, token).expect("domain token parses");
                assert!(value.matches(kind));
                assert!(kind.domain().contains(&value.token()));
                assert!(kind.domain().contains(&value.next().token()));
            }
        }
    }

    #[test]
    fn binding_rejects_out_of_domain() {
        let binding = AttributeBinding::new(AttributeKind::FnLock, "/tmp/fn_lock");
        assert_eq!(binding.parse("1\n"), Some(AttributeValue::Switch(true)));
        assert_eq!(binding.parse("2"), None);
        assert_eq!(binding.parse(""), None);

        let led = AttributeBinding::new(AttributeKind::KeyboardLed, "/tmp/brightness");
        assert_eq!(
            led.parse(" 2 \n"),
            Some(AttributeValue::Backlight(BacklightLevel::Max))
        );
        assert_eq!(led.parse("3"), None);
    }

    #[test]
    fn kind_names_parse() {
        assert_eq!("fnlock".parse::<AttributeKind>(), Ok(AttributeKind::FnLock));
        assert_eq!("Conservation".parse::<AttributeKind>(), Ok(AttributeKind::Conservation));
        assert_eq!("kbd-led".parse::<AttributeKind>(), Ok(AttributeKind::KeyboardLed));
        assert!("volume".parse::<AttributeKind>().is_err());
        for kind in AttributeKind::ALL {
            assert_eq!(kind.cli_name().parse::<AttributeKind>(), Ok(kind));
            assert_eq!(AttributeKind::ALL[kind.index()], kind);
        }
    }

    #[test]
    fn display_texts() {
        assert_eq!(AttributeValue::Switch(true).display_text(), "Enabled");
        assert_eq!(AttributeValue::Switch(false).short_text(), "Off");
        assert_eq!(AttributeValue::Backlight(BacklightLevel::Min).to_string(), "Min");
    }
}
