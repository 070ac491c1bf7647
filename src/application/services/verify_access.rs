//! Step 5: unattended access verification.
//!
//! Re-enters the host the way the management layer will: key-only SSH as
//! the automation account (`BatchMode`, `IdentitiesOnly`), then `whoami`
//! and a non-interactive sudo probe. Agent keys and cached credentials
//! cannot fake a pass. Failures here are fatal.

use anyhow::Result;

use crate::application::ports::{Escalation, ProgressReporter, RemoteShell};
use crate::application::services::stderr_detail;
use crate::domain::error::EnrollError;
use crate::domain::session::EnrollSession;

/// Verify key-based login and passwordless sudo for the automation account.
///
/// Skipped in dry-run mode since the key was never installed.
///
/// # Errors
///
/// Returns [`EnrollError::Verification`] when the login is rejected, the
/// identity does not match, or `sudo -n` is denied.
pub async fn verify_unattended_access(
    shell: &impl RemoteShell,
    session: &EnrollSession,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    let Some(account) = session.host.automation().cloned() else {
        anyhow::bail!("automation account not resolved before access verification");
    };
    if session.dry_run {
        reporter.step("skipping access verification (dry run, key not installed)");
        return Ok(());
    }
    let fail = |reason: String| EnrollError::Verification {
        account: account.name.clone(),
        home: account.home.clone(),
        reason,
    };

    reporter.detail(&format!(
        "ssh -o BatchMode=yes {}@{} whoami",
        account.name, session.host.address
    ));
    let whoami = match shell
        .run_with_key(&account.name, "whoami", Escalation::None)
        .await
    {
        Ok(output) => output,
        Err(err) => return Err(fail(format!("key-based login failed: {err}")).into()),
    };
    if !whoami.status.success() {
        return Err(fail(format!(
            "key-based login was rejected{}",
            stderr_detail(&whoami)
        ))
        .into());
    }
    let reported = String::from_utf8_lossy(&whoami.stdout).trim().to_string();
    if reported != account.name {
        return Err(fail(format!(
            "logged in as '{reported}', expected '{}'",
            account.name
        ))
        .into());
    }

    reporter.detail("checking non-interactive sudo for the automation account");
    let sudo = match shell
        .run_with_key(&account.name, "true", Escalation::Sudo)
        .await
    {
        Ok(output) => output,
        Err(err) => return Err(fail(format!("sudo probe failed: {err}")).into()),
    };
    if !sudo.status.success() {
        return Err(fail(format!(
            "non-interactive sudo ('sudo -n') was denied{}",
            stderr_detail(&sudo)
        ))
        .into());
    }

    reporter.success(&format!(
        "'{}' has key-based login and passwordless sudo",
        account.name
    ));
    Ok(())
}

// ── Unit tests ────────────────────────────────────────────────────────────────
