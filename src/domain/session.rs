//! Per-run enrollment session state.
//!
//! One `EnrollSession` is constructed per `muster enroll` invocation and
//! threaded `&mut` through the pipeline; there is no ambient global state.
//! The session owns the three pieces of state with invariants attached:
//!
//! - sudo capability transitions exactly once away from `Unknown`;
//! - the cached sudo password lives in memory only and never appears in
//!   `Debug` output, logs, or serialized forms;
//! - the compensation stack is pushed only by steps that mutated something
//!   and is drained exactly once, in LIFO order, on abort.

use std::fmt;

use anyhow::Result;

use crate::domain::host::TargetHost;
use crate::domain::stage::EnrollStage;

// ── Sudo capability ───────────────────────────────────────────────────────────

/// How the bootstrap login may escalate on the target host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SudoCapability {
    /// Not yet probed.
    #[default]
    Unknown,
    /// `sudo -n` succeeds without a password.
    Passwordless,
    /// Sudo works with the password cached in the session.
    PasswordCached,
    /// Neither probe succeeded. No mutating step may run.
    None,
}

impl SudoCapability {
    /// Whether this capability permits privileged remote operations.
    #[must_use]
    pub fn is_usable(self) -> bool {
        matches!(self, Self::Passwordless | Self::PasswordCached)
    }

    /// Label used in the enrollment summary.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Passwordless => "passwordless sudo",
            Self::PasswordCached => "sudo with cached password",
            Self::None => "none",
        }
    }
}

// ── Sudo secret ───────────────────────────────────────────────────────────────

/// A sudo password cached for the lifetime of one session.
///
/// Not `Clone` and not `Serialize`; `Debug` prints a placeholder. The only
/// way to read it back is [`SudoSecret::expose`], called at the single
/// point where the password is piped to a remote `sudo -S`.
pub struct SudoSecret(String);

impl SudoSecret {
    #[must_use]
    pub fn new(secret: String) -> Self {
        Self(secret)
    }

    /// The raw secret. Callers must pass it to process stdin only, never
    /// into argv, environment, log lines, or files.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SudoSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SudoSecret(redacted)")
    }
}

// ── Compensations and warnings ────────────────────────────────────────────────

/// An inverse action recorded by a mutating step, applied on abort.
///
/// Inventory registration is the only step that registers one: key
/// installation is idempotent and deliberately left in place on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compensation {
    /// Remove the inventory line appended for `address`.
    RemoveRegistryLine { address: String },
}

/// Non-fatal problem classes surfaced at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// The inventory file could not be read or written.
    Registry,
    /// The Ansible ping failed or could not be attempted.
    Ping,
    /// The private key had loose permissions and was corrected.
    KeyPermissions,
}

/// A warning collected during the run. Never aborts the pipeline.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

// ── Session ───────────────────────────────────────────────────────────────────

/// All mutable state for one enrollment run.
#[derive(Debug)]
pub struct EnrollSession {
    /// The host being enrolled. The automation account is filled in by the
    /// resolver.
    pub host: TargetHost,
    /// Read-only preview mode: inspect and report, never mutate.
    pub dry_run: bool,
    stage: EnrollStage,
    capability: SudoCapability,
    secret: Option<SudoSecret>,
    compensations: Vec<Compensation>,
    warnings: Vec<Warning>,
    inventory_mutated: bool,
}

impl EnrollSession {
    #[must_use]
    pub fn new(host: TargetHost, dry_run: bool) -> Self {
        Self {
            host,
            dry_run,
            stage: EnrollStage::Init,
            capability: SudoCapability::Unknown,
            secret: None,
            compensations: Vec::new(),
            warnings: Vec::new(),
            inventory_mutated: false,
        }
    }

    /// Current pipeline stage.
    #[must_use]
    pub fn stage(&self) -> EnrollStage {
        self.stage
    }

    /// Move to the given stage. The orchestrator is the only caller.
    pub fn advance(&mut self, stage: EnrollStage) {
        self.stage = stage;
    }

    /// Detected sudo capability.
    #[must_use]
    pub fn capability(&self) -> SudoCapability {
        self.capability
    }

    /// Record the detected capability. May be called once.
    ///
    /// # Errors
    ///
    /// Returns an error if the capability was already determined.
    pub fn set_capability(&mut self, capability: SudoCapability) -> Result<()> {
        anyhow::ensure!(
            self.capability == SudoCapability::Unknown,
            "sudo capability already determined as {:?}",
            self.capability
        );
        self.capability = capability;
        Ok(())
    }

    /// Cache the validated sudo password for this session.
    pub fn cache_secret(&mut self, secret: SudoSecret) {
        self.secret = Some(secret);
    }

    /// The cached sudo password, if capability is `PasswordCached`.
    #[must_use]
    pub fn secret(&self) -> Option<&SudoSecret> {
        self.secret.as_ref()
    }

    /// Record the inverse of a completed mutation.
    pub fn push_compensation(&mut self, compensation: Compensation) {
        if let Compensation::RemoveRegistryLine { .. } = compensation {
            self.inventory_mutated = true;
        }
        self.compensations.push(compensation);
    }

    /// Pop the most recently recorded compensation.
    pub fn pop_compensation(&mut self) -> Option<Compensation> {
        self.compensations.pop()
    }

    /// Whether any compensations are pending.
    #[must_use]
    pub fn has_pending_compensations(&self) -> bool {
        !self.compensations.is_empty()
    }

    /// Whether this run appended an inventory line.
    #[must_use]
    pub fn inventory_mutated(&self) -> bool {
        self.inventory_mutated
    }

    /// Collect a non-fatal warning.
    pub fn warn(&mut self, kind: WarningKind, message: impl Into<String>) {
        self.warnings.push(Warning {
            kind,
            message: message.into(),
        });
    }

    /// Warnings collected so far, in the order they occurred.
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
