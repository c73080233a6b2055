//! Elevation strategies and startup selection.
//!
//! - [`helper`] - `pkexec`/`sudo` helper process elevator
//!
//! The strategy set is closed (`ElevationMethod`). Selection happens once at
//! startup by probing `PATH`; the chosen elevator is then used for every
//! privileged write. A failing strategy is reported, never swapped for the
//! other one behind the caller's back.

pub mod helper;

pub use helper::{HelperElevator, interpret_exit};

use legion::elevation::{ElevationChoice, ElevationMethod};
use tracing::{debug, info, warn};

/// Whether `program` resolves on `PATH`.
pub fn helper_on_path(program: &str) -> bool {
    match which::which(program) {
        Ok(path) => {
            debug!("found {} at {}", program, path.display());
            true
        }
        Err(_) => false,
    }
}

/// Resolve the configured choice to a concrete method.
///
/// `Auto` probes `ElevationMethod::PROBE_ORDER` with `is_available`. When no
/// helper is present the desktop helper is returned anyway, so the first
/// elevated write surfaces `HelperMissing` instead of the process failing
/// to start.
pub fn select_method<F>(choice: ElevationChoice, is_available: F) -> ElevationMethod
where
    F: Fn(&str) -> bool,
{
    match choice {
        ElevationChoice::Pkexec => ElevationMethod::Polkit,
        ElevationChoice::Sudo => ElevationMethod::Sudo,
        ElevationChoice::Auto => ElevationMethod::PROBE_ORDER
            .into_iter()
            .find(|method| is_available(method.program()))
            .unwrap_or_else(|| {
                warn!("No elevation helper found on PATH (tried pkexec, sudo)");
                ElevationMethod::Polkit
            }),
    }
}

/// Probe and create the elevator for `choice`.
pub fn probe_elevator(choice: ElevationChoice) -> HelperElevator {
    let method = select_method(choice, helper_on_path);
    info!("Elevation method: {} (configured: {:?})", method, choice);
    HelperElevator::new(method)
}
