//! Step 1: SSH connectivity probe.
//!
//! Runs `true` on the target as the bootstrap login. Proves address, port,
//! and authentication in one round trip before anything else happens.

use anyhow::Result;

use crate::application::ports::{Escalation, ProgressReporter, RemoteShell};
use crate::application::services::stderr_detail;
use crate::domain::error::EnrollError;
use crate::domain::host::TargetHost;

/// Probe SSH connectivity to `host` as its bootstrap login.
///
/// # Errors
///
/// Returns [`EnrollError::Connectivity`] when the transport fails or the
/// probe command exits non-zero.
pub async fn probe_connection(
    shell: &impl RemoteShell,
    host: &TargetHost,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    reporter.detail(&format!(
        "ssh -p {} {}@{} true",
        host.port, host.login, host.address
    ));
    let detail = match shell.run(&host.login, "true", Escalation::None).await {
        Ok(output) if output.status.success() => {
            reporter.success(&format!(
                "{} is reachable as '{}'",
                host.address, host.login
            ));
            return Ok(());
        }
        Ok(output) => stderr_detail(&output),
        Err(err) => format!(": {err}"),
    };
    Err(EnrollError::Connectivity {
        address: host.address.clone(),
        port: host.port,
        login: host.login.clone(),
        detail,
    }
    .into())
}

// ── Unit tests ────────────────────────────────────────────────────────────────
