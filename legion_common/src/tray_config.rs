//! Application configuration (`config.toml`).
//!
//! All sections are optional; a missing file yields the built-in defaults
//! for the IdeaPad `VPC2004` platform device.
//!
//! # TOML Example
//!
//! ```toml
//! [shared]
//! log_level = "info"
//!
//! [paths]
//! base_dir = "/sys/devices/pci0000:00/0000:00:14.3/PNP0C09:00/VPC2004:00"
//! kbd_backlight = "/sys/class/leds/platform::kbd_backlight/brightness"
//!
//! [elevation]
//! method = "auto"
//! write_policy = "auto"
//!
//! [tray]
//! refresh_interval_ms = 5000
//! notifications = true
//! ```

use crate::attribute::{AttributeBinding, AttributeKind};
use crate::config::{ConfigError, SharedConfig};
use crate::consts::{
    CONSERVATION_FILE, DEFAULT_BASE_DIR, DEFAULT_REFRESH_INTERVAL_MS, FN_LOCK_FILE,
    KBD_BACKLIGHT_FILE,
};
use crate::elevation::ElevationChoice;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrayConfig {
    /// Logging and identity.
    #[serde(default)]
    pub shared: SharedConfig,
    /// Attribute file locations.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Privilege elevation.
    #[serde(default)]
    pub elevation: ElevationConfig,
    /// Presentation loop.
    #[serde(default)]
    pub tray: TraySection,
}

impl TrayConfig {
    /// Validate all sections.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` on the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.paths.validate()?;
        self.tray.validate()?;
        Ok(())
    }

    /// Attribute bindings indexed by `AttributeKind::index`.
    pub fn bindings(&self) -> [AttributeBinding; 3] {
        AttributeKind::ALL.map(|kind| AttributeBinding::new(kind, self.paths.path_for(kind)))
    }
}

/// Attribute file locations.
///
/// Per-attribute overrides take precedence over `base_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Platform device directory.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
    /// Override for `conservation_mode`.
    #[serde(default)]
    pub conservation: Option<PathBuf>,
    /// Override for `fn_lock`.
    #[serde(default)]
    pub fn_lock: Option<PathBuf>,
    /// Override for the keyboard backlight `brightness`.
    #[serde(default)]
    pub kbd_backlight: Option<PathBuf>,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(DEFAULT_BASE_DIR)
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            conservation: None,
            fn_lock: None,
            kbd_backlight: None,
        }
    }
}

impl PathsConfig {
    /// All attributes under a single directory, with default file names.
    pub fn under(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Resolved file path for `kind`.
    pub fn path_for(&self, kind: AttributeKind) -> PathBuf {
        let (override_path, relative) = match kind {
            AttributeKind::Conservation => (&self.conservation, CONSERVATION_FILE),
            AttributeKind::FnLock => (&self.fn_lock, FN_LOCK_FILE),
            AttributeKind::KeyboardLed => (&self.kbd_backlight, KBD_BACKLIGHT_FILE),
        };
        override_path
            .clone()
            .unwrap_or_else(|| self.base_dir.join(relative))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for kind in AttributeKind::ALL {
            let path = self.path_for(kind);
            if !path.is_absolute() {
                return Err(ConfigError::ValidationError(format!(
                    "{kind} path must be absolute, got {}",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// How attribute writes reach the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Try a direct write first; elevate only when it is refused with
    /// `PermissionDenied` and the process is not root.
    #[default]
    Auto,
    /// Always go through the elevator.
    AlwaysElevate,
    /// Never elevate; unprivileged writes fail with `PermissionDenied`.
    Direct,
}

/// Privilege elevation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElevationConfig {
    /// Strategy preference.
    #[serde(default)]
    pub method: ElevationChoice,
    /// Write routing.
    #[serde(default)]
    pub write_policy: WritePolicy,
}

/// Presentation loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraySection {
    /// Period of the background status refresh.
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    /// Emit a notification after each toggle.
    #[serde(default = "default_notifications")]
    pub notifications: bool,
}

fn default_refresh_interval_ms() -> u64 {
    DEFAULT_REFRESH_INTERVAL_MS
}

fn default_notifications() -> bool {
    true
}

impl Default for TraySection {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval_ms(),
            notifications: default_notifications(),
        }
    }
}

impl TraySection {
    /// Refresh period.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "tray.refresh_interval_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use std::io::Write;
    use std::path::Path;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_point_at_vpc2004() {
        let config = TrayConfig::default();
        assert!(config.validate().is_ok());

        let bindings = config.bindings();
        assert_eq!(
            bindings[0].path(),
            Path::new(DEFAULT_BASE_DIR).join("conservation_mode")
        );
        assert_eq!(bindings[1].path(), Path::new(DEFAULT_BASE_DIR).join("fn_lock"));
        assert!(
            bindings[2]
                .path()
                .ends_with("leds/platform::kbd_backlight/brightness")
        );
        for kind in AttributeKind::ALL {
            assert_eq!(bindings[kind.index()].kind(), kind);
        }
        assert_eq!(config.elevation.method, ElevationChoice::Auto);
        assert_eq!(config.elevation.write_policy, WritePolicy::Auto);
        assert_eq!(config.tray.refresh_interval(), Duration::from_secs(5));
    }

    #[test]
    fn override_wins_over_base_dir() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[paths]
base_dir = "/tmp/legion"
kbd_backlight = "/sys/class/leds/platform::kbd_backlight/brightness"

[elevation]
method = "sudo"
write_policy = "always_elevate"
"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = TrayConfig::load(file.path()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.paths.path_for(AttributeKind::Conservation),
            PathBuf::from("/tmp/legion/conservation_mode")
        );
        assert_eq!(
            config.paths.path_for(AttributeKind::KeyboardLed),
            PathBuf::from("/sys/class/leds/platform::kbd_backlight/brightness")
        );
        assert_eq!(config.elevation.method, ElevationChoice::Sudo);
        assert_eq!(config.elevation.write_policy, WritePolicy::AlwaysElevate);
    }

    #[test]
    fn unknown_method_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[elevation]\nmethod = \"doas\"\n").unwrap();
        file.flush().unwrap();

        assert!(matches!(
            TrayConfig::load(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn zero_refresh_interval_rejected() {
        let mut config = TrayConfig::default();
        config.tray.refresh_interval_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn relative_path_rejected() {
        let mut config = TrayConfig::default();
        config.paths.fn_lock = Some(PathBuf::from("fn_lock"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("fn-lock"));
    }
}
