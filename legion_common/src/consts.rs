//! Workspace-wide constants.
//!
//! Single source of truth for default paths, file names and timings.

/// ACPI `VPC2004` platform device directory exposed by the `ideapad_acpi` driver.
pub const DEFAULT_BASE_DIR: &str = "/sys/devices/pci0000:00/0000:00:14.3/PNP0C09:00/VPC2004:00";

/// Conservation mode attribute, relative to the base directory.
pub const CONSERVATION_FILE: &str = "conservation_mode";

/// FnLock attribute, relative to the base directory.
pub const FN_LOCK_FILE: &str = "fn_lock";

/// Keyboard backlight brightness attribute, relative to the base directory.
pub const KBD_BACKLIGHT_FILE: &str = "leds/platform::kbd_backlight/brightness";

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/legion-tray/config.toml";

/// Canonical service name (used for logging).
pub const SERVICE_NAME: &str = "legion-tray";

/// Default status refresh interval in milliseconds.
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 5000;

/// Display duration hint for desktop notifications, in milliseconds.
pub const NOTIFICATION_TIMEOUT_MS: u32 = 2000;
