//! Terminal prompts: the sudo password and the account choice.
//!
//! All interactivity funnels through here. In non-interactive mode (CI,
//! `--yes`) every prompt has a fixed answer: no password, accept a single
//! candidate, fall back to the configured default account, and refuse
//! ambiguity outright.

use anyhow::{Context, Result};

use crate::application::ports::{CandidateResolver, SecretPrompt};
use crate::domain::account::PasswdEntry;
use crate::domain::session::SudoSecret;

pub struct TerminalPrompts {
    non_interactive: bool,
}

impl TerminalPrompts {
    #[must_use]
    pub fn new(non_interactive: bool) -> Self {
        Self { non_interactive }
    }

    /// Free-form account name entry. Empty input means abort.
    fn ask_name(&self) -> Result<Option<String>> {
        let name: String = dialoguer::Input::new()
            .with_prompt("Automation account name (empty to abort)")
            .allow_empty(true)
            .interact_text()
            .context("account name input")?;
        let name = name.trim().to_string();
        Ok(if name.is_empty() { None } else { Some(name) })
    }
}

impl SecretPrompt for TerminalPrompts {
    fn prompt_sudo_password(&self, login: &str, address: &str) -> Result<Option<SudoSecret>> {
        if self.non_interactive {
            return Ok(None);
        }
        let password = dialoguer::Password::new()
            .with_prompt(format!("[sudo] password for {login}@{address}"))
            .allow_empty_password(false)
            .interact()
            .context("sudo password prompt")?;
        Ok(Some(SudoSecret::new(password)))
    }
}

impl CandidateResolver for TerminalPrompts {
    fn resolve_none(&self, default_account: &str) -> Result<Option<String>> {
        if self.non_interactive {
            return Ok(Some(default_account.to_string()));
        }
        let items = [
            format!("Use the default account '{default_account}'"),
            "Enter an account name".to_string(),
            "Abort".to_string(),
        ];
        let choice = dialoguer::Select::new()
            .with_prompt("No automation account matched the discovery rules")
            .items(&items)
            .default(0)
            .interact()
            .context("account selection")?;
        match choice {
            0 => Ok(Some(default_account.to_string())),
            1 => self.ask_name(),
            _ => Ok(None),
        }
    }

    fn resolve_single(&self, candidate: &PasswdEntry) -> Result<Option<String>> {
        if self.non_interactive {
            return Ok(Some(candidate.name.clone()));
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!(
                "Use '{}' (uid {}) as the automation account?",
                candidate.name, candidate.uid
            ))
            .default(true)
            .interact()
            .context("account confirmation")?;
        if confirmed {
            Ok(Some(candidate.name.clone()))
        } else {
            self.ask_name()
        }
    }

    fn resolve_many(&self, candidates: &[PasswdEntry]) -> Result<Option<String>> {
        if self.non_interactive {
            anyhow::bail!(
                "{} accounts match the discovery rules; re-run interactively, or narrow \
                 discovery.name_tokens or the uid range in the configuration",
                candidates.len()
            );
        }
        let mut items: Vec<String> = candidates
            .iter()
            .map(|candidate| format!("{} (uid {})", candidate.name, candidate.uid))
            .collect();
        items.push("Enter another name".to_string());
        items.push("Abort".to_string());
        let choice = dialoguer::Select::new()
            .with_prompt("Several accounts match; pick the automation account")
            .items(&items)
            .default(0)
            .interact()
            .context("account selection")?;
        if let Some(candidate) = candidates.get(choice) {
            Ok(Some(candidate.name.clone()))
        } else if choice == candidates.len() {
            self.ask_name()
        } else {
            Ok(None)
        }
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
