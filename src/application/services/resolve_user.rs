//! Step 3: automation account resolution.
//!
//! Lists remote accounts with `getent passwd`, filters them through the
//! discovery rules, and routes the 0/1/N outcome through the
//! [`CandidateResolver`] port. Whatever name comes back is validated and
//! re-checked against the host before it is used anywhere: the operator may
//! have typed it, and discovery output ages.

use anyhow::Result;

use crate::application::ports::{CandidateResolver, Escalation, ProgressReporter, RemoteShell};
use crate::application::services::stderr_detail;
use crate::domain::account::{DiscoveryRules, PasswdEntry, find_candidates, parse_passwd};
use crate::domain::error::EnrollError;
use crate::domain::host::validate_login;
use crate::domain::session::EnrollSession;

/// Resolve the automation account and record it on the session's host.
///
/// # Errors
///
/// Returns [`EnrollError::Resolution`] when the account listing fails, the
/// operator aborts the choice, or the chosen account does not exist.
pub async fn resolve_automation_account(
    shell: &impl RemoteShell,
    resolver: &impl CandidateResolver,
    rules: &DiscoveryRules,
    default_account: &str,
    session: &mut EnrollSession,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    let login = session.host.login.clone();
    let address = session.host.address.clone();
    let fail = |reason: String| EnrollError::Resolution {
        address: address.clone(),
        reason,
    };

    reporter.detail("listing remote accounts (getent passwd)");
    let listing = match shell.run(&login, "getent passwd", Escalation::None).await {
        Ok(output) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).into_owned()
        }
        Ok(output) => {
            return Err(fail(format!(
                "'getent passwd' failed{}",
                stderr_detail(&output)
            ))
            .into());
        }
        Err(err) => return Err(fail(format!("cannot list accounts: {err}")).into()),
    };

    let entries = parse_passwd(&listing);
    let candidates = find_candidates(&entries, rules);
    reporter.detail(&format!(
        "{} of {} accounts match the discovery rules",
        candidates.len(),
        entries.len()
    ));

    let chosen = match candidates.as_slice() {
        [] => resolver.resolve_none(default_account)?,
        [single] => resolver.resolve_single(single)?,
        many => resolver.resolve_many(many)?,
    };
    let Some(name) = chosen else {
        return Err(fail("no account was selected".to_string()).into());
    };
    validate_login(&name).map_err(|err| fail(err.to_string()))?;

    // The choice may be operator-typed; confirm the account exists and take
    // uid and home from the host, not from stale discovery output.
    let entry = match shell
        .run(&login, &format!("getent passwd {name}"), Escalation::None)
        .await
    {
        Ok(output) if output.status.success() => {
            let row = String::from_utf8_lossy(&output.stdout).into_owned();
            row.lines().next().and_then(PasswdEntry::parse)
        }
        Ok(_) | Err(_) => None,
    };
    let Some(entry) = entry else {
        return Err(fail(format!(
            "account '{name}' was not found on the host; create it first or choose another"
        ))
        .into());
    };

    reporter.success(&format!(
        "automation account: {} (uid {}, home {})",
        entry.name, entry.uid, entry.home
    ));
    session.host.set_automation(entry.to_account())
}

// ── Unit tests ────────────────────────────────────────────────────────────────
