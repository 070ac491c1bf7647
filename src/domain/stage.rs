//! Enrollment pipeline stages.
//!
//! Stages are named for the state the pipeline has *reached*, not the work
//! in flight: `Probed` means the SSH round-trip succeeded, `KeyInstalled`
//! means the credential is on the host. The pipeline advances strictly in
//! `next()` order; `Aborted` and `RolledBack` are reachable only through the
//! orchestrator's failure path.

/// A stage of the enrollment pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollStage {
    /// Session constructed, nothing attempted yet.
    Init,
    /// SSH connectivity as the bootstrap login confirmed.
    Probed,
    /// Sudo capability determined (passwordless or password-cached).
    PrivilegeKnown,
    /// Automation account chosen and confirmed to exist.
    UserResolved,
    /// Public key present in the automation account's `authorized_keys`.
    KeyInstalled,
    /// Key-based login and non-interactive sudo verified.
    AccessVerified,
    /// Host present in the inventory file.
    Inventoried,
    /// Management-layer ping attempted (success or downgraded warning).
    Verified,
    /// Pipeline complete.
    Done,
    /// A fatal error stopped the pipeline.
    Aborted,
    /// Compensating actions were applied after an abort.
    RolledBack,
}

impl EnrollStage {
    /// The stage that follows this one in the happy path, or `None` for
    /// terminal stages.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Init => Some(Self::Probed),
            Self::Probed => Some(Self::PrivilegeKnown),
            Self::PrivilegeKnown => Some(Self::UserResolved),
            Self::UserResolved => Some(Self::KeyInstalled),
            Self::KeyInstalled => Some(Self::AccessVerified),
            Self::AccessVerified => Some(Self::Inventoried),
            Self::Inventoried => Some(Self::Verified),
            Self::Verified => Some(Self::Done),
            Self::Done | Self::Aborted | Self::RolledBack => None,
        }
    }

    /// Human-readable description of the work that reaches this stage.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Init => "Starting enrollment",
            Self::Probed => "Probing SSH connectivity",
            Self::PrivilegeKnown => "Detecting sudo capability",
            Self::UserResolved => "Resolving automation account",
            Self::KeyInstalled => "Installing public key",
            Self::AccessVerified => "Verifying unattended access",
            Self::Inventoried => "Registering host in inventory",
            Self::Verified => "Pinging host through Ansible",
            Self::Done => "Enrollment complete",
            Self::Aborted => "Enrollment aborted",
            Self::RolledBack => "Enrollment rolled back",
        }
    }

    /// Whether the pipeline stops at this stage.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Aborted | Self::RolledBack)
    }
}
