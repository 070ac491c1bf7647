//! Shared mock infrastructure for unit tests.
//!
//! Provides the scripted one-host simulator and the in-memory registry,
//! plus canned prompt/resolver/ping doubles, so each test file doesn't
//! have to re-define the same boilerplate.

#![allow(clippy::expect_used)]
#![allow(dead_code)] // not every test file uses every double

use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::Mutex;

use anyhow::Result;

use muster_cli::application::ports::{
    CandidateResolver, Escalation, HostRegistry, ManagementPing, ProgressReporter, RemoteShell,
    SecretPrompt,
};
use muster_cli::application::services::orchestrator::EnrollPlan;
use muster_cli::domain::account::{DiscoveryRules, PasswdEntry};
use muster_cli::domain::host::TargetHost;
use muster_cli::domain::pubkey::PublicKey;
use muster_cli::domain::registry::{contains_address, remove_address};
use muster_cli::domain::session::{EnrollSession, SudoSecret};

/// The key pair every pipeline test installs.
pub const KEY_LINE: &str = "ssh-ed25519 \
    AAAAC3NzaC1lZDI1NTE5AAAAIOMqqnkVzrm0SdG6UOoqKLsabgH5C9okWi0dh2l9GKJl \
    muster@control";

/// Marker that identifies the key material inside `authorized_keys`.
pub const KEY_DATA_MARKER: &str = "AAAAC3NzaC1lZDI1NTE5";

/// `KEY_LINE` with the continuation whitespace collapsed, as it would sit
/// in an `authorized_keys` file.
pub fn key_line() -> String {
    KEY_LINE.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A passwd table with exactly one discovery candidate (`svc-auto`)
/// under rules that match on the `svc` token.
pub const LISTING_WITH_CANDIDATE: &str = "root:x:0:0:root:/root:/bin/bash\n\
    daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin\n\
    alice:x:1000:1000:Alice:/home/alice:/bin/bash\n\
    svc-auto:x:1501:1501::/home/svc-auto:/bin/bash\n";

/// A passwd table with no discovery candidate but an existing `ansible`
/// account, so the default-account offer succeeds.
pub const LISTING_DEFAULT_ONLY: &str = "root:x:0:0:root:/root:/bin/bash\n\
    alice:x:1000:1000:Alice:/home/alice:/bin/bash\n\
    ansible:x:1500:1500::/home/ansible:/bin/bash\n";

// ── Output helpers ────────────────────────────────────────────────────────────

pub fn ok_output(stdout: &str) -> Result<Output> {
    Ok(Output {
        status: ExitStatus::from_raw(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    })
}

pub fn failed_output(code: i32, stderr: &str) -> Result<Output> {
    Ok(Output {
        status: ExitStatus::from_raw(code << 8),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    })
}

// ── Fixture helpers ───────────────────────────────────────────────────────────

pub fn test_key() -> PublicKey {
    PublicKey::parse(KEY_LINE).expect("test key parses")
}

pub fn svc_rules() -> DiscoveryRules {
    DiscoveryRules {
        uid_min: 1000,
        uid_max: 59999,
        name_tokens: vec!["svc".to_string()],
    }
}

pub fn test_plan(key: &PublicKey) -> EnrollPlan<'_> {
    EnrollPlan {
        key,
        key_path: Path::new("/keys/id_ed25519"),
        rules: svc_rules(),
        default_account: "ansible",
        hostname_override: None,
    }
}

pub fn test_session(dry_run: bool) -> EnrollSession {
    let host = TargetHost::new("10.0.0.5", 22, "alice").expect("valid host");
    EnrollSession::new(host, dry_run)
}

// ── Mock: scripted remote host ────────────────────────────────────────────────

/// A one-host simulator that answers every remote command the pipeline can
/// issue and records them all. Sudo behaviour is scripted per instance;
/// the install transaction mutates `authorized` so later verification
/// steps observe the change.
pub struct ScriptedHost {
    passwordless: bool,
    accepted_password: Option<&'static str>,
    listing: &'static str,
    hostname: &'static str,
    pub authorized: Mutex<String>,
    commands: Mutex<Vec<String>>,
    key_commands: Mutex<Vec<String>>,
}

impl ScriptedHost {
    /// A host where the bootstrap login has passwordless sudo.
    pub fn passwordless(listing: &'static str) -> Self {
        Self::new(true, None, listing)
    }

    /// A host where sudo requires the given password.
    pub fn password_gated(password: &'static str, listing: &'static str) -> Self {
        Self::new(false, Some(password), listing)
    }

    /// A host where the bootstrap login cannot escalate at all.
    pub fn locked_down(listing: &'static str) -> Self {
        Self::new(false, None, listing)
    }

    fn new(
        passwordless: bool,
        accepted_password: Option<&'static str>,
        listing: &'static str,
    ) -> Self {
        Self {
            passwordless,
            accepted_password,
            listing,
            hostname: "host5",
            authorized: Mutex::new(String::new()),
            commands: Mutex::new(Vec::new()),
            key_commands: Mutex::new(Vec::new()),
        }
    }

    /// Pre-authorize the test key, as on an already-enrolled host.
    pub fn with_key_installed(self) -> Self {
        *self.authorized.lock().expect("lock") = format!("{}\n", key_line());
        self
    }

    pub fn authorized(&self) -> String {
        self.authorized.lock().expect("lock").clone()
    }

    /// Every command issued over the bootstrap login, tagged with its
    /// escalation (`plain:`, `sudo:`, or `askpass:`).
    pub fn ran(&self) -> Vec<String> {
        self.commands.lock().expect("lock").clone()
    }

    /// Every command issued over the installed key.
    pub fn ran_with_key(&self) -> Vec<String> {
        self.key_commands.lock().expect("lock").clone()
    }

    /// True once the install transaction has run.
    pub fn mutated(&self) -> bool {
        self.ran()
            .iter()
            .any(|entry| entry.contains("umask 077 && mkdir -p") && entry.contains("printf"))
    }

    fn escalated_ok(&self, escalation: Escalation<'_>) -> bool {
        match escalation {
            Escalation::None => true,
            Escalation::Sudo => self.passwordless,
            Escalation::SudoWithPassword(secret) => {
                self.accepted_password == Some(secret.expose())
            }
        }
    }

    fn tag(escalation: Escalation<'_>) -> &'static str {
        match escalation {
            Escalation::None => "plain",
            Escalation::Sudo => "sudo",
            Escalation::SudoWithPassword(_) => "askpass",
        }
    }
}

impl RemoteShell for ScriptedHost {
    async fn run(
        &self,
        _login: &str,
        command: &str,
        escalation: Escalation<'_>,
    ) -> Result<Output> {
        self.commands
            .lock()
            .expect("lock")
            .push(format!("{}:{command}", Self::tag(escalation)));

        if command == "true" {
            return if self.escalated_ok(escalation) {
                ok_output("")
            } else {
                failed_output(1, "sudo: a password is required\n")
            };
        }
        if command == "getent passwd" {
            return ok_output(self.listing);
        }
        if let Some(name) = command.strip_prefix("getent passwd ") {
            let prefix = format!("{name}:");
            return match self.listing.lines().find(|line| line.starts_with(&prefix)) {
                Some(line) => ok_output(&format!("{line}\n")),
                None => failed_output(2, ""),
            };
        }
        if command == "hostname -s" {
            return ok_output(&format!("{}\n", self.hostname));
        }

        // Everything below needs the claimed escalation to actually work.
        if !self.escalated_ok(escalation) {
            return failed_output(1, "sudo: a password is required\n");
        }
        if command.starts_with("cat ") {
            return ok_output(&self.authorized());
        }
        if command.starts_with("test -d ") {
            return ok_output("");
        }
        if command.starts_with("umask 077 && mkdir -p ") {
            if command.contains("printf") {
                let mut authorized = self.authorized.lock().expect("lock");
                authorized.push_str(&key_line());
                authorized.push('\n');
            }
            return ok_output("");
        }
        panic!("unexpected remote command: {command}")
    }

    async fn run_with_key(
        &self,
        login: &str,
        command: &str,
        _escalation: Escalation<'_>,
    ) -> Result<Output> {
        self.key_commands
            .lock()
            .expect("lock")
            .push(command.to_string());

        let key_installed = self.authorized().contains(KEY_DATA_MARKER);
        match command {
            "whoami" if key_installed => ok_output(&format!("{login}\n")),
            "whoami" => failed_output(255, "Permission denied (publickey).\n"),
            // Service accounts carry NOPASSWD independent of the bootstrap login.
            "true" if key_installed => ok_output(""),
            "true" => failed_output(255, "Permission denied (publickey).\n"),
            other => panic!("unexpected key-only command: {other}"),
        }
    }
}

// ── Mock: in-memory registry ──────────────────────────────────────────────────

/// An in-memory [`HostRegistry`] that records every append and remove.
pub struct MemRegistry {
    content: Mutex<String>,
    appended: Mutex<Vec<String>>,
    removed: Mutex<Vec<String>>,
    location: PathBuf,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl MemRegistry {
    pub fn new(content: &str) -> Self {
        Self {
            content: Mutex::new(content.to_string()),
            appended: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
            location: PathBuf::from("/etc/ansible/hosts"),
            fail_reads: false,
            fail_writes: false,
        }
    }

    pub fn content(&self) -> String {
        self.content.lock().expect("lock").clone()
    }

    pub fn appended(&self) -> Vec<String> {
        self.appended.lock().expect("lock").clone()
    }

    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().expect("lock").clone()
    }
}

impl HostRegistry for MemRegistry {
    async fn is_registered(&self, address: &str) -> Result<bool> {
        anyhow::ensure!(!self.fail_reads, "Permission denied (os error 13)");
        Ok(contains_address(&self.content.lock().expect("lock"), address))
    }

    async fn append(&self, line: &str) -> Result<()> {
        anyhow::ensure!(!self.fail_writes, "Permission denied (os error 13)");
        self.appended.lock().expect("lock").push(line.to_string());
        let mut content = self.content.lock().expect("lock");
        content.push_str(line);
        content.push('\n');
        Ok(())
    }

    async fn remove(&self, address: &str) -> Result<()> {
        anyhow::ensure!(!self.fail_writes, "Permission denied (os error 13)");
        self.removed.lock().expect("lock").push(address.to_string());
        let mut content = self.content.lock().expect("lock");
        if let Some(remaining) = remove_address(&content, address) {
            *content = remaining;
        }
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.location
    }
}

// ── Mock: prompts ─────────────────────────────────────────────────────────────

/// Declines the password prompt, as a non-interactive run does.
pub struct NoPrompt;

impl SecretPrompt for NoPrompt {
    fn prompt_sudo_password(&self, _: &str, _: &str) -> Result<Option<SudoSecret>> {
        Ok(None)
    }
}

/// Supplies a fixed password and counts how often it was asked.
pub struct PromptOnce {
    password: &'static str,
    calls: Mutex<u32>,
}

impl PromptOnce {
    pub fn new(password: &'static str) -> Self {
        Self {
            password,
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock().expect("lock")
    }
}

impl SecretPrompt for PromptOnce {
    fn prompt_sudo_password(&self, _: &str, _: &str) -> Result<Option<SudoSecret>> {
        *self.calls.lock().expect("lock") += 1;
        Ok(Some(SudoSecret::new(self.password.to_string())))
    }
}

/// Panics when consulted; for flows that must never ask for a password.
pub struct PanicPrompt;

impl SecretPrompt for PanicPrompt {
    fn prompt_sudo_password(&self, _: &str, _: &str) -> Result<Option<SudoSecret>> {
        panic!("the password prompt must not be consulted in this flow")
    }
}

// ── Mock: resolvers ───────────────────────────────────────────────────────────

/// Accepts whatever the discovery offers first.
pub struct ChooseFirst;

impl CandidateResolver for ChooseFirst {
    fn resolve_none(&self, default_account: &str) -> Result<Option<String>> {
        Ok(Some(default_account.to_string()))
    }

    fn resolve_single(&self, candidate: &PasswdEntry) -> Result<Option<String>> {
        Ok(Some(candidate.name.clone()))
    }

    fn resolve_many(&self, candidates: &[PasswdEntry]) -> Result<Option<String>> {
        Ok(Some(candidates[0].name.clone()))
    }
}

/// Declines every offer, as an operator aborting the menus does.
pub struct RefuseAll;

impl CandidateResolver for RefuseAll {
    fn resolve_none(&self, _: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn resolve_single(&self, _: &PasswdEntry) -> Result<Option<String>> {
        Ok(None)
    }

    fn resolve_many(&self, _: &[PasswdEntry]) -> Result<Option<String>> {
        Ok(None)
    }
}

// ── Mock: management ping ─────────────────────────────────────────────────────

/// Ansible answers `pong`.
pub struct Pong;

impl ManagementPing for Pong {
    async fn ping(&self, _: &str, _: &str, _: &Path) -> Result<Output> {
        ok_output("10.0.0.5 | SUCCESS => {\"ping\": \"pong\"}\n")
    }
}

/// Ansible reaches nothing.
pub struct Unreachable;

impl ManagementPing for Unreachable {
    async fn ping(&self, _: &str, _: &str, _: &Path) -> Result<Output> {
        failed_output(4, "10.0.0.5 | UNREACHABLE!\n")
    }
}

/// Panics when invoked; for flows that must skip the ping.
pub struct PanicPing;

impl ManagementPing for PanicPing {
    async fn ping(&self, _: &str, _: &str, _: &Path) -> Result<Output> {
        panic!("the management ping must not run in this flow")
    }
}

// ── Mock: reporters ───────────────────────────────────────────────────────────

/// Swallows all progress output.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn step(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warn(&self, _: &str) {}
    fn detail(&self, _: &str) {}
}

/// Records every progress line, tagged with its channel.
pub struct RecordingReporter {
    lines: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("lock").clone()
    }

    fn push(&self, channel: &str, msg: &str) {
        self.lines.lock().expect("lock").push(format!("{channel}:{msg}"));
    }
}

impl Default for RecordingReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, msg: &str) {
        self.push("step", msg);
    }
    fn success(&self, msg: &str) {
        self.push("success", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn detail(&self, msg: &str) {
        self.push("detail", msg);
    }
}
