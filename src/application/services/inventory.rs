//! Step 6: inventory registration.
//!
//! Appends the host's registry line unless an uncommented line already
//! registers the address. This is the only step that records a
//! compensation: a line appended here is removed again if a later step
//! aborts the run. Registry problems never abort: the host is enrolled at
//! this point, so failures degrade to a warning with the exact line to add
//! by hand.

use anyhow::Result;
use chrono::Utc;

use crate::application::ports::{HostRegistry, ProgressReporter};
use crate::domain::registry::format_entry;
use crate::domain::session::{Compensation, EnrollSession, WarningKind};

/// Register the session's host in the inventory under `hostname`.
///
/// # Errors
///
/// Never returns a registry failure; those become session warnings.
pub async fn register_host(
    registry: &impl HostRegistry,
    hostname: &str,
    session: &mut EnrollSession,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    let address = session.host.address.clone();
    let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let line = format_entry(&address, hostname, &timestamp);
    let location = registry.location().display().to_string();

    match registry.is_registered(&address).await {
        Ok(true) => {
            reporter.success(&format!("{address} is already registered in {location}"));
            return Ok(());
        }
        Ok(false) => {}
        Err(err) => {
            let message = format!(
                "cannot read the inventory {location}: {err}. Add this line manually:\n  {line}"
            );
            reporter.warn(&message);
            session.warn(WarningKind::Registry, message);
            return Ok(());
        }
    }

    if session.dry_run {
        reporter.step(&format!("would append to {location}: {line}"));
        return Ok(());
    }

    match registry.append(&line).await {
        Ok(()) => {
            session.push_compensation(Compensation::RemoveRegistryLine { address });
            reporter.success(&format!("registered in {location}"));
        }
        Err(err) => {
            let message = format!(
                "cannot write the inventory {location}: {err}. Add this line manually:\n  {line}"
            );
            reporter.warn(&message);
            session.warn(WarningKind::Registry, message);
        }
    }
    Ok(())
}

// ── Unit tests ────────────────────────────────────────────────────────────────
