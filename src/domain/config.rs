//! Domain types and validators for muster configuration.
//!
//! Pure functions only, with no I/O or filesystem access. Loading the
//! file lives in `crate::infra::config`.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::account::DiscoveryRules;

/// Fallback inventory location when neither the CLI nor the config names one.
pub const DEFAULT_INVENTORY_PATH: &str = "/etc/ansible/hosts";

// ── Config schema ─────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.muster/config.yaml`.
///
/// Every field has a default, so a missing or empty file behaves like the
/// built-in configuration. Unknown fields are ignored for forward
/// compatibility.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MusterConfig {
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub ssh: SshConfig,
}

/// Per-user defaults the CLI flags override.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Bootstrap login used when neither the target spec nor `--login` has one.
    pub login: Option<String>,
    /// Private key path used when `--identity` is absent.
    pub identity: Option<String>,
    /// Inventory file path used when `--inventory` is absent.
    pub inventory: Option<String>,
}

/// Automation-account discovery heuristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Inclusive lower bound of the service-account uid range.
    #[serde(default = "default_uid_min")]
    pub uid_min: u32,
    /// Inclusive upper bound of the service-account uid range.
    #[serde(default = "default_uid_max")]
    pub uid_max: u32,
    /// Name substrings that mark an automation account.
    #[serde(default = "default_name_tokens")]
    pub name_tokens: Vec<String>,
    /// Account offered when discovery finds no candidates.
    #[serde(default = "default_account")]
    pub default_account: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            uid_min: default_uid_min(),
            uid_max: default_uid_max(),
            name_tokens: default_name_tokens(),
            default_account: default_account(),
        }
    }
}

impl DiscoveryConfig {
    /// The pure matching rules fed to the resolver.
    #[must_use]
    pub fn rules(&self) -> DiscoveryRules {
        DiscoveryRules {
            uid_min: self.uid_min,
            uid_max: self.uid_max,
            name_tokens: self.name_tokens.clone(),
        }
    }
}

/// SSH transport tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshConfig {
    /// `ConnectTimeout` passed to ssh, in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Wall-clock bound on any single remote command, in seconds.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            command_timeout_secs: default_command_timeout(),
        }
    }
}

fn default_uid_min() -> u32 {
    1000
}

fn default_uid_max() -> u32 {
    59999
}

fn default_name_tokens() -> Vec<String> {
    ["ansible", "automation", "svc", "deploy"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_account() -> String {
    "ansible".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_command_timeout() -> u64 {
    30
}

// ── Validators ────────────────────────────────────────────────────────────────

/// Validate the loaded configuration before any of it is used.
///
/// # Errors
///
/// Returns an error listing every violation if any check fails.
pub fn validate_config(config: &MusterConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if config.discovery.uid_min > config.discovery.uid_max {
        errors.push(format!(
            "discovery.uid_min ({}) exceeds discovery.uid_max ({})",
            config.discovery.uid_min, config.discovery.uid_max
        ));
    }
    if config.discovery.name_tokens.is_empty() {
        errors.push("discovery.name_tokens must not be empty".to_string());
    }
    if config.discovery.name_tokens.iter().any(|t| t.trim().is_empty()) {
        errors.push("discovery.name_tokens entries must not be blank".to_string());
    }
    if crate::domain::host::validate_login(&config.discovery.default_account).is_err() {
        errors.push(format!(
            "discovery.default_account '{}' is not a valid account name",
            config.discovery.default_account
        ));
    }
    if config.ssh.connect_timeout_secs == 0 || config.ssh.command_timeout_secs == 0 {
        errors.push("ssh timeouts must be at least 1 second".to_string());
    }

    anyhow::ensure!(
        errors.is_empty(),
        "Configuration validation failed:\n{}",
        errors.join("\n")
    );
    Ok(())
}

// ── Unit tests ────────────────────────────────────────────────────────────────
