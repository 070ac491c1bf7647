//! Step 2: sudo capability detection.
//!
//! Orders the checks so the operator is prompted only when necessary:
//! `sudo -n true` first, then one password prompt validated with
//! `sudo -S true`. A validated password is cached on the session and the
//! prompt never repeats. When neither path works the pipeline halts with
//! remediation; escalation rights are never granted by this tool.

use anyhow::Result;

use crate::application::ports::{Escalation, ProgressReporter, RemoteShell, SecretPrompt};
use crate::domain::error::EnrollError;
use crate::domain::session::{EnrollSession, SudoCapability};

/// Detect and record how the bootstrap login may escalate.
///
/// # Errors
///
/// Returns [`EnrollError::Privilege`] when no escalation path works. The
/// capability is still recorded as [`SudoCapability::None`] so callers can
/// see what was determined.
pub async fn detect_capability(
    shell: &impl RemoteShell,
    secrets: &impl SecretPrompt,
    session: &mut EnrollSession,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    let login = session.host.login.clone();
    let address = session.host.address.clone();

    reporter.detail("checking passwordless sudo (sudo -n true)");
    if command_succeeded(shell.run(&login, "true", Escalation::Sudo).await) {
        session.set_capability(SudoCapability::Passwordless)?;
        reporter.success("passwordless sudo available");
        return Ok(());
    }

    let mut prompt_suppressed = false;
    match secrets.prompt_sudo_password(&login, &address)? {
        Some(secret) => {
            reporter.detail("validating the password (sudo -S true)");
            let escalation = Escalation::SudoWithPassword(&secret);
            if command_succeeded(shell.run(&login, "true", escalation).await) {
                session.cache_secret(secret);
                session.set_capability(SudoCapability::PasswordCached)?;
                reporter.success("sudo works with the provided password (cached for this run)");
                return Ok(());
            }
        }
        None => prompt_suppressed = true,
    }

    session.set_capability(SudoCapability::None)?;
    let detail = if prompt_suppressed {
        " (the password prompt is suppressed in non-interactive mode)"
    } else {
        " (the password was not accepted)"
    };
    Err(EnrollError::Privilege {
        login,
        address,
        detail: detail.to_string(),
    }
    .into())
}

fn command_succeeded(outcome: Result<std::process::Output>) -> bool {
    outcome.map(|output| output.status.success()).unwrap_or(false)
}

// ── Unit tests ────────────────────────────────────────────────────────────────
