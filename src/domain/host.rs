//! Target host identity and the `[login@]address` argument format.
//!
//! Pure validation and parsing; no I/O, no async.

use anyhow::Result;
use regex::Regex;
use std::sync::LazyLock;

/// Hostnames and IPv4 addresses. Checked before any shell or registry
/// interpolation so a crafted address cannot smuggle metacharacters or
/// comment markers into remote commands or inventory lines.
pub static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Safety: this is a compile-time constant pattern and cannot fail.
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9.-]{0,252}$").expect("valid regex")
});

/// POSIX account names, same shape `useradd` accepts.
pub static LOGIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z_][a-z0-9_-]{0,31}$").expect("valid regex")
});

/// The host being enrolled.
///
/// `address`, `port`, and `login` are fixed at construction. The automation
/// account is unknown until the resolver runs and is set exactly once.
#[derive(Debug, Clone)]
pub struct TargetHost {
    /// Address or hostname reachable over SSH.
    pub address: String,
    /// SSH port.
    pub port: u16,
    /// Login for bootstrap commands, before the automation account exists.
    pub login: String,
    automation: Option<RemoteAccount>,
}

/// An account that exists on the remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAccount {
    pub name: String,
    pub uid: u32,
    pub home: String,
}

impl TargetHost {
    /// Build a target host from already-validated parts.
    ///
    /// # Errors
    ///
    /// Returns an error if the address or login fails validation.
    pub fn new(address: &str, port: u16, login: &str) -> Result<Self> {
        validate_address(address)?;
        validate_login(login)?;
        Ok(Self {
            address: address.to_string(),
            port,
            login: login.to_string(),
            automation: None,
        })
    }

    /// The resolved automation account, if the resolver has run.
    #[must_use]
    pub fn automation(&self) -> Option<&RemoteAccount> {
        self.automation.as_ref()
    }

    /// Record the resolved automation account. May be called once.
    ///
    /// # Errors
    ///
    /// Returns an error if an automation account was already recorded.
    pub fn set_automation(&mut self, account: RemoteAccount) -> Result<()> {
        anyhow::ensure!(
            self.automation.is_none(),
            "automation account already resolved to '{}'",
            self.automation.as_ref().map_or("", |a| a.name.as_str())
        );
        self.automation = Some(account);
        Ok(())
    }
}

/// Split a `[login@]address` argument into its parts.
///
/// The login portion is optional; a bare address returns `(None, address)`.
///
/// # Errors
///
/// Returns an error if either part fails validation, or if the spec contains
/// more than one `@`.
pub fn parse_target_spec(spec: &str) -> Result<(Option<String>, String)> {
    let mut parts = spec.splitn(2, '@');
    let first = parts.next().unwrap_or_default();
    match parts.next() {
        None => {
            validate_address(first)?;
            Ok((None, first.to_string()))
        }
        Some(address) => {
            anyhow::ensure!(
                !address.contains('@'),
                "invalid target '{spec}': expected [login@]address"
            );
            validate_login(first)?;
            validate_address(address)?;
            Ok((Some(first.to_string()), address.to_string()))
        }
    }
}

/// Validate a host address or hostname.
///
/// # Errors
///
/// Returns an error if the address is empty or contains characters outside
/// `[A-Za-z0-9.-]`.
pub fn validate_address(address: &str) -> Result<()> {
    anyhow::ensure!(
        ADDRESS_RE.is_match(address),
        "invalid address '{address}': expected a hostname or IPv4 address"
    );
    Ok(())
}

/// Validate a POSIX login name.
///
/// # Errors
///
/// Returns an error if the name is not a valid account name.
pub fn validate_login(login: &str) -> Result<()> {
    anyhow::ensure!(
        LOGIN_RE.is_match(login),
        "invalid login '{login}': expected a lowercase POSIX account name"
    );
    Ok(())
}

// ── Unit tests ────────────────────────────────────────────────────────────────
