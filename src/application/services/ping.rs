//! Step 7: management-layer smoke test.
//!
//! One ad-hoc `ansible -m ping` against the freshly registered host, as the
//! automation account with the enrolled key. Strictly advisory: a missing
//! `ansible` binary or a failed ping is a warning, because the enrollment
//! itself has already been verified over SSH.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::{ManagementPing, ProgressReporter};
use crate::application::services::stderr_detail;
use crate::domain::session::{EnrollSession, WarningKind};

/// Ping the host through Ansible. Never fails the pipeline.
///
/// # Errors
///
/// Only internal misuse (no resolved automation account) is an error.
pub async fn ping_management_layer(
    ping: &impl ManagementPing,
    key_path: &Path,
    session: &mut EnrollSession,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    let Some(account) = session.host.automation().cloned() else {
        anyhow::bail!("automation account not resolved before the management ping");
    };
    if session.dry_run {
        reporter.step("skipping the Ansible ping (dry run, credential not installed)");
        return Ok(());
    }
    let address = session.host.address.clone();

    reporter.detail(&format!(
        "ansible all -i '{address},' -m ping -u {}",
        account.name
    ));
    match ping.ping(&address, &account.name, key_path).await {
        Ok(output) if output.status.success() => {
            reporter.success("Ansible ping succeeded");
        }
        Ok(output) => {
            let message = format!(
                "the Ansible ping failed{}. The host is enrolled; check the control \
                 node's Ansible setup",
                stderr_detail(&output)
            );
            reporter.warn(&message);
            session.warn(WarningKind::Ping, message);
        }
        Err(err) => {
            let message = format!(
                "could not run ansible: {err}. The host is enrolled; install Ansible \
                 on this control node to verify management connectivity"
            );
            reporter.warn(&message);
            session.warn(WarningKind::Ping, message);
        }
    }
    Ok(())
}

// ── Unit tests ────────────────────────────────────────────────────────────────
