//! Ctrl-C handling.
//!
//! Commands keep no state that needs unwinding, so an interrupt prints the
//! cancellation notice and exits immediately.

use crate::exit_codes;

/// Install the process-wide interrupt handler.
pub fn install() {
    let installed = ctrlc::set_handler(|| {
        println!("\n⚠ Operation cancelled by user");
        std::process::exit(exit_codes::INTERRUPTED);
    });
    if let Err(e) = installed {
        tracing::debug!(error = %e, "could not install interrupt handler");
    }
}
