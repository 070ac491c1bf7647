//! Configuration loading from `~/.muster/config.yaml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::config::{MusterConfig, validate_config};

/// Muster's state directory (`~/.muster`), also home to the known-hosts
/// file.
///
/// # Errors
///
/// Returns an error when the home directory cannot be determined.
pub fn state_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("cannot determine the home directory")?;
    Ok(home.join(".muster"))
}

/// Path of the configuration file.
///
/// # Errors
///
/// Returns an error when the home directory cannot be determined.
pub fn config_path() -> Result<PathBuf> {
    Ok(state_dir()?.join("config.yaml"))
}

/// Load and validate the configuration. A missing file yields the
/// defaults.
///
/// # Errors
///
/// Returns an error when the file is unreadable, not valid YAML, or fails
/// validation.
pub fn load_config(path: &Path) -> Result<MusterConfig> {
    if !path.exists() {
        return Ok(MusterConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: MusterConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;
    validate_config(&config)
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    Ok(config)
}

// ── Unit tests ────────────────────────────────────────────────────────────────
