//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::Path;
use std::process::Output;

use anyhow::Result;

use crate::domain::account::PasswdEntry;
use crate::domain::session::SudoSecret;

// ── Escalation ────────────────────────────────────────────────────────────────

/// How a remote command acquires privileges.
///
/// `Sudo` maps to `sudo -n` (fail rather than prompt); `SudoWithPassword`
/// feeds the cached secret to `sudo -S` on stdin, exactly once per
/// invocation. The secret is borrowed, never copied into the variant.
#[derive(Debug, Clone, Copy)]
pub enum Escalation<'a> {
    /// Run as the login account.
    None,
    /// `sudo -n`: non-interactive, no password.
    Sudo,
    /// `sudo -S` with the session's cached password on stdin.
    SudoWithPassword(&'a SudoSecret),
}

// ── Remote transport ──────────────────────────────────────────────────────────

/// The SSH transport to the target host.
///
/// Implementations capture the address, port, and local identity; callers
/// choose the remote login and escalation per command. Both methods return
/// the raw `Output`; callers decide what a non-zero exit means.
#[allow(async_fn_in_trait)]
pub trait RemoteShell {
    /// Run `command` as `login`, authenticating however the local SSH setup
    /// allows (agent, default keys, password prompt on a TTY).
    async fn run(&self, login: &str, command: &str, escalation: Escalation<'_>) -> Result<Output>;

    /// Run `command` as `login`, authenticating *only* with the enrolled
    /// key (`BatchMode`, `IdentitiesOnly`). Used by the access verifier so a
    /// pass cannot be faked by agent keys or cached credentials.
    async fn run_with_key(
        &self,
        login: &str,
        command: &str,
        escalation: Escalation<'_>,
    ) -> Result<Output>;
}

// ── Operator interaction ──────────────────────────────────────────────────────

/// Source of the one sudo password prompt.
pub trait SecretPrompt {
    /// Ask for the sudo password. Returns `Ok(None)` when prompting is
    /// unavailable (non-interactive mode) or the operator declined.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt itself fails.
    fn prompt_sudo_password(&self, login: &str, address: &str) -> Result<Option<SudoSecret>>;
}

/// Resolution of the automation-account choice.
///
/// One method per match count so the policy (confirm single, menu for many,
/// default for none) lives behind the port, not in the resolver service.
/// Every method returns the chosen account name, or `None` when the
/// operator aborted.
pub trait CandidateResolver {
    /// No account matched the discovery rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails.
    fn resolve_none(&self, default_account: &str) -> Result<Option<String>>;

    /// Exactly one account matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails.
    fn resolve_single(&self, candidate: &PasswdEntry) -> Result<Option<String>>;

    /// Two or more accounts matched, in discovery order.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt fails, or in non-interactive mode
    /// where the ambiguity cannot be resolved.
    fn resolve_many(&self, candidates: &[PasswdEntry]) -> Result<Option<String>>;
}

// ── Inventory registry ────────────────────────────────────────────────────────

/// The host registry the management layer reads (the Ansible inventory).
///
/// Implementations answer membership by address at column zero of a line,
/// append whole lines, and remove the line registering an address. All
/// errors are surfaced to the caller, which decides whether they warrant a
/// warning (registration) or only a message (rollback).
#[allow(async_fn_in_trait)]
pub trait HostRegistry {
    /// Whether `address` is already registered.
    async fn is_registered(&self, address: &str) -> Result<bool>;

    /// Append `line` as a new last line.
    async fn append(&self, line: &str) -> Result<()>;

    /// Remove the line registering `address`, if present.
    async fn remove(&self, address: &str) -> Result<()>;

    /// Where the registry lives, for operator-facing messages.
    fn location(&self) -> &Path;
}

// ── Management layer ──────────────────────────────────────────────────────────

/// The management-layer smoke test (`ansible -m ping`).
#[allow(async_fn_in_trait)]
pub trait ManagementPing {
    /// Ping `address` as `account` using `key`. Errors and non-zero exits
    /// are both treated as "ping failed" by the caller; neither aborts.
    async fn ping(&self, address: &str, account: &str, key: &Path) -> Result<Output>;
}

// ── Progress reporting ────────────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait; no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// Emit a verbose-only detail line (remote command classes, decisions).
    fn detail(&self, message: &str);
}
