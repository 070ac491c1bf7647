//! The Ansible inventory file.
//!
//! Direct filesystem access first; when the control node denies it, one
//! `sudo -n` fallback per operation. The registry format itself (one
//! address per line, `#` comments) lives in [`crate::domain::registry`];
//! this adapter only moves bytes with the right privileges.
//!
//! No lock is taken: concurrent enrollments from several control terminals
//! can interleave reads and appends. Operators coordinate externally.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::HostRegistry;
use crate::application::services::stderr_detail;
use crate::domain::registry::{contains_address, remove_address};
use crate::infra::command_runner::CommandRunner;

pub struct InventoryFile<R: CommandRunner> {
    path: PathBuf,
    runner: R,
}

impl<R: CommandRunner> InventoryFile<R> {
    pub fn with_path(runner: R, path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            runner,
        }
    }

    /// Current registry content. A missing file reads as empty.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read directly
    /// or through `sudo -n`.
    pub async fn read(&self) -> Result<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
                self.read_with_sudo().await
            }
            Err(err) => {
                Err(err).with_context(|| format!("reading {}", self.path.display()))
            }
        }
    }

    async fn read_with_sudo(&self) -> Result<String> {
        let path = self.path.display().to_string();
        let output = self
            .runner
            .run("sudo", &["-n", "cat", &path])
            .await
            .with_context(|| format!("reading {path} with sudo"))?;
        anyhow::ensure!(
            output.status.success(),
            "sudo -n cat {path} failed{}",
            stderr_detail(&output)
        );
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    // Creation modes are pinned (dir 0755, file 0644) so ansible can read
    // the inventory whatever the operator's umask is. Existing files and
    // directories keep their modes.
    fn append_direct(&self, payload: &str) -> std::io::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
                std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o755))?;
            }
        }
        let fresh = !self.path.exists();
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if fresh {
            file.set_permissions(std::fs::Permissions::from_mode(0o644))?;
        }
        file.write_all(payload.as_bytes())
    }

    async fn append_with_sudo(&self, payload: &str) -> Result<()> {
        let path = self.path.display().to_string();
        let script = match self.path.parent() {
            Some(parent) => format!(
                "umask 022 && mkdir -p {} && tee -a {} >/dev/null",
                quote(&parent.display().to_string()),
                quote(&path)
            ),
            None => format!("umask 022 && tee -a {} >/dev/null", quote(&path)),
        };
        let output = self
            .runner
            .run_with_stdin("sudo", &["-n", "sh", "-c", &script], payload.as_bytes())
            .await
            .with_context(|| format!("appending to {path} with sudo"))?;
        anyhow::ensure!(
            output.status.success(),
            "sudo -n append to {path} failed{}",
            stderr_detail(&output)
        );
        Ok(())
    }

    fn write_direct(&self, content: &str) -> std::io::Result<()> {
        std::fs::write(&self.path, content)
    }

    async fn write_with_sudo(&self, content: &str) -> Result<()> {
        let path = self.path.display().to_string();
        let script = format!("tee {} >/dev/null", quote(&path));
        let output = self
            .runner
            .run_with_stdin("sudo", &["-n", "sh", "-c", &script], content.as_bytes())
            .await
            .with_context(|| format!("rewriting {path} with sudo"))?;
        anyhow::ensure!(
            output.status.success(),
            "sudo -n rewrite of {path} failed{}",
            stderr_detail(&output)
        );
        Ok(())
    }
}

impl<R: CommandRunner> HostRegistry for InventoryFile<R> {
    async fn is_registered(&self, address: &str) -> Result<bool> {
        Ok(contains_address(&self.read().await?, address))
    }

    async fn append(&self, line: &str) -> Result<()> {
        let current = self.read().await?;
        let mut payload = String::new();
        if !current.is_empty() && !current.ends_with('\n') {
            payload.push('\n');
        }
        payload.push_str(line);
        payload.push('\n');
        match self.append_direct(&payload) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
                self.append_with_sudo(&payload).await
            }
            Err(err) => {
                Err(err).with_context(|| format!("appending to {}", self.path.display()))
            }
        }
    }

    async fn remove(&self, address: &str) -> Result<()> {
        let current = self.read().await?;
        let Some(remaining) = remove_address(&current, address) else {
            return Ok(());
        };
        match self.write_direct(&remaining) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
                self.write_with_sudo(&remaining).await
            }
            Err(err) => {
                Err(err).with_context(|| format!("rewriting {}", self.path.display()))
            }
        }
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

fn quote(word: &str) -> String {
    shell_escape::escape(std::borrow::Cow::Borrowed(word)).into_owned()
}

// ── Unit tests ────────────────────────────────────────────────────────────────
