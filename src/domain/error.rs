//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.
//!
//! Every variant is fatal: it stops the pipeline, and nothing retries it.
//! Registry write failures and Ansible ping failures are *not* errors; they
//! degrade to [`crate::domain::session::Warning`]s and the pipeline
//! continues.

use thiserror::Error;

// ── Enrollment errors ─────────────────────────────────────────────────────────

/// Fatal enrollment errors, one variant per pipeline failure class.
///
/// Display text is operator-facing: it names what failed, where on the
/// remote host to look, and what to do next.
#[derive(Debug, Error)]
pub enum EnrollError {
    #[error(
        "Cannot reach {address}:{port} over SSH as '{login}'{detail}.\n\
         Check that the host is up, the address and port are correct, and that\n\
         '{login}' can authenticate (key, agent, or password)."
    )]
    Connectivity {
        address: String,
        port: u16,
        login: String,
        /// Trailing diagnostic, pre-formatted as `: <reason>` or empty.
        detail: String,
    },

    #[error(
        "'{login}' has no usable sudo on {address}{detail}.\n\
         Nothing was changed on the host. Grant escalation rights first:\n\
         \x20 usermod -aG sudo {login}\n\
         or add an /etc/sudoers.d/ rule for '{login}', then re-run.\n\
         Alternatively enroll with a different bootstrap login: --login <user>"
    )]
    Privilege {
        login: String,
        address: String,
        /// Trailing diagnostic, pre-formatted as ` (<reason>)` or empty.
        detail: String,
    },

    #[error("Cannot resolve an automation account on {address}: {reason}")]
    Resolution { address: String, reason: String },

    #[error(
        "Installing the public key for '{account}' failed: {reason}\n\
         Inspect {home}/.ssh/ on the host before re-running."
    )]
    Installation {
        account: String,
        home: String,
        reason: String,
    },

    #[error(
        "Unattended access check failed for '{account}': {reason}\n\
         Inspect {home}/.ssh/authorized_keys and /etc/sudoers.d/ on the host.\n\
         This tool reports access problems but never edits sudoers rules."
    )]
    Verification {
        account: String,
        home: String,
        reason: String,
    },
}

impl EnrollError {
    /// Short machine-readable class name, used in JSON output.
    #[must_use]
    pub fn class(&self) -> &'static str {
        match self {
            Self::Connectivity { .. } => "connectivity",
            Self::Privilege { .. } => "privilege",
            Self::Resolution { .. } => "resolution",
            Self::Installation { .. } => "installation",
            Self::Verification { .. } => "verification",
        }
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
