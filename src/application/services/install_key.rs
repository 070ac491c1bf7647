//! Step 4: public key installation.
//!
//! Idempotent: membership in `authorized_keys` is decided in Rust from a
//! read-only inspection, keyed on algorithm and key material so a changed
//! comment never causes a duplicate line. The mutation itself is one shell
//! transaction that also heals directory and file ownership and modes, so a
//! host with a broken `.ssh` setup is repaired on every run.

use anyhow::Result;

use crate::application::ports::{Escalation, ProgressReporter, RemoteShell};
use crate::application::services::{escalation_for, sh_word, stderr_detail};
use crate::domain::error::EnrollError;
use crate::domain::pubkey::{PublicKey, authorized_keys_contains};
use crate::domain::session::EnrollSession;

/// Ensure `key` is authorized for the session's automation account.
///
/// In dry-run mode only the read-only inspection runs and the would-be
/// changes are reported.
///
/// # Errors
///
/// Returns [`EnrollError::Installation`] when the inspection or the remote
/// transaction fails. Requires a usable sudo capability and a resolved
/// automation account.
pub async fn install_credential(
    shell: &impl RemoteShell,
    key: &PublicKey,
    session: &EnrollSession,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    let Some(account) = session.host.automation().cloned() else {
        anyhow::bail!("automation account not resolved before key installation");
    };
    let escalation = escalation_for(session)?;
    let login = session.host.login.clone();

    let ssh_dir = format!("{}/.ssh", account.home);
    let auth_file = format!("{ssh_dir}/authorized_keys");
    let fail = |reason: String| EnrollError::Installation {
        account: account.name.clone(),
        home: account.home.clone(),
        reason,
    };

    // Read-only inspection. `|| true` keeps a missing file from looking
    // like a failure; only sudo itself can make this exit non-zero.
    reporter.detail(&format!("inspecting {auth_file}"));
    let inspect_cmd = format!("cat {} 2>/dev/null || true", sh_word(&auth_file));
    let inspect = shell
        .run(&login, &inspect_cmd, escalation)
        .await
        .map_err(|err| fail(format!("cannot inspect {auth_file}: {err}")))?;
    if !inspect.status.success() {
        return Err(fail(format!(
            "cannot inspect {auth_file}{}",
            stderr_detail(&inspect)
        ))
        .into());
    }
    let present = authorized_keys_contains(&String::from_utf8_lossy(&inspect.stdout), key);
    reporter.detail(&format!(
        "{} key is {}",
        key.algorithm,
        if present {
            "already authorized"
        } else {
            "not present yet"
        }
    ));

    if session.dry_run {
        if present {
            reporter.success(&format!(
                "{auth_file} already authorizes this key; would only re-assert permissions"
            ));
        } else {
            let dir_exists = shell
                .run(&login, &format!("test -d {}", sh_word(&ssh_dir)), escalation)
                .await
                .map(|output| output.status.success())
                .unwrap_or(false);
            if !dir_exists {
                reporter.step(&format!(
                    "would create {ssh_dir} (mode 700, owner {})",
                    account.name
                ));
            }
            reporter.step(&format!("would append the key to {auth_file} (mode 600)"));
        }
        reporter.step("dry run: no remote changes made");
        return Ok(());
    }

    // One transaction: append when absent, then heal modes and ownership
    // unconditionally.
    let dir = sh_word(&ssh_dir);
    let file = sh_word(&auth_file);
    let owner = sh_word(&format!("{}:", account.name));
    let append = if present {
        String::new()
    } else {
        format!(
            "printf '%s\\n' {line} >> {file} && ",
            line = sh_word(&key.authorized_line())
        )
    };
    let script = format!(
        "umask 077 && mkdir -p {dir} && {append}chmod 700 {dir} && chmod 600 {file} \
         && chown {owner} {dir} && chown {owner} {file}"
    );
    let applied = shell
        .run(&login, &script, escalation)
        .await
        .map_err(|err| fail(format!("remote transaction failed: {err}")))?;
    if !applied.status.success() {
        return Err(fail(format!(
            "remote transaction failed{}",
            stderr_detail(&applied)
        ))
        .into());
    }

    if present {
        reporter.success(&format!(
            "key already authorized for '{}'; ownership and permissions re-asserted",
            account.name
        ));
    } else {
        reporter.success(&format!("public key appended to {auth_file}"));
    }
    Ok(())
}

// ── Unit tests ────────────────────────────────────────────────────────────────
