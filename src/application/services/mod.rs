//! Application services: one module per pipeline step, plus the
//! orchestrator that sequences them.
//!
//! Services hold the step semantics and talk to the outside world only
//! through the ports in [`crate::application::ports`]. They never print
//! directly; progress goes through `ProgressReporter`.

pub mod install_key;
pub mod inventory;
pub mod orchestrator;
pub mod ping;
pub mod privilege;
pub mod probe;
pub mod resolve_user;
pub mod verify_access;

use std::borrow::Cow;
use std::process::Output;

use anyhow::Result;

use crate::application::ports::Escalation;
use crate::domain::session::{EnrollSession, SudoCapability};

/// Quote one word for a POSIX shell. Remote commands pass through exactly
/// one shell parse, so every interpolated value is quoted exactly once.
pub(crate) fn sh_word(word: &str) -> String {
    shell_escape::escape(Cow::Borrowed(word)).into_owned()
}

/// The last non-empty stderr line, pre-formatted as `: <line>` for error
/// messages, or empty when there is nothing useful to show.
pub(crate) fn stderr_detail(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr)
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| format!(": {line}"))
        .unwrap_or_default()
}

/// The escalation mechanism matching the session's detected capability.
///
/// # Errors
///
/// Returns an error if no usable capability was detected; mutating steps
/// must never run in that state.
pub(crate) fn escalation_for(session: &EnrollSession) -> Result<Escalation<'_>> {
    match session.capability() {
        SudoCapability::Passwordless => Ok(Escalation::Sudo),
        SudoCapability::PasswordCached => session
            .secret()
            .map(Escalation::SudoWithPassword)
            .ok_or_else(|| anyhow::anyhow!("capability is password-cached but no secret is held")),
        other => anyhow::bail!("no usable escalation path (capability: {other:?})"),
    }
}
