//! SSH transport to the target host.
//!
//! One [`SshClient`] per enrollment, holding the destination and the local
//! key material. Escalation wrapping happens here: the remote command is
//! quoted once and handed to `sh -c` under `sudo`, and a cached password
//! travels exclusively over stdin to `sudo -S`.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{Escalation, RemoteShell};
use crate::infra::command_runner::CommandRunner;

/// SSH client bound to one destination.
pub struct SshClient<R: CommandRunner> {
    runner: R,
    address: String,
    port: u16,
    identity: PathBuf,
    known_hosts: PathBuf,
    connect_timeout: Duration,
}

impl<R: CommandRunner> SshClient<R> {
    pub fn new(
        runner: R,
        address: &str,
        port: u16,
        identity: &Path,
        known_hosts: &Path,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            runner,
            address: address.to_string(),
            port,
            identity: identity.to_path_buf(),
            known_hosts: known_hosts.to_path_buf(),
            connect_timeout,
        }
    }

    /// Options shared by every connection.
    ///
    /// `accept-new` pins a host key on first contact and still rejects a
    /// changed key later; the pins live in muster's own known-hosts file so
    /// enrollment never touches the operator's `~/.ssh/known_hosts`.
    fn base_args(&self) -> Vec<String> {
        vec![
            "-p".to_string(),
            self.port.to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout.as_secs()),
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
            "-o".to_string(),
            format!("UserKnownHostsFile={}", self.known_hosts.display()),
            "-o".to_string(),
            "LogLevel=ERROR".to_string(),
            "-o".to_string(),
            "NumberOfPasswordPrompts=1".to_string(),
        ]
    }

    async fn exec(
        &self,
        login: &str,
        command: &str,
        escalation: Escalation<'_>,
        key_only: bool,
    ) -> Result<Output> {
        let mut args = self.base_args();
        if key_only {
            args.push("-i".to_string());
            args.push(self.identity.display().to_string());
            args.push("-o".to_string());
            args.push("IdentitiesOnly=yes".to_string());
            args.push("-o".to_string());
            args.push("BatchMode=yes".to_string());
        }
        args.push(format!("{login}@{}", self.address));

        let (remote_command, stdin) = wrap_escalation(command, escalation);
        args.push(remote_command);

        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        match stdin {
            Some(input) => self.runner.run_with_stdin("ssh", &arg_refs, &input).await,
            None => self.runner.run("ssh", &arg_refs).await,
        }
    }
}

impl<R: CommandRunner> RemoteShell for SshClient<R> {
    async fn run(&self, login: &str, command: &str, escalation: Escalation<'_>) -> Result<Output> {
        self.exec(login, command, escalation, false).await
    }

    async fn run_with_key(
        &self,
        login: &str,
        command: &str,
        escalation: Escalation<'_>,
    ) -> Result<Output> {
        self.exec(login, command, escalation, true).await
    }
}

/// Wrap `command` for the requested escalation. Returns the remote command
/// line and the bytes to pipe to stdin, if any.
///
/// `-H` keeps root's HOME out of the login account's; `-n` fails instead
/// of prompting; `-S -p ''` reads the password from stdin without echoing
/// a prompt into the output. The password itself never appears in the
/// command line.
fn wrap_escalation(command: &str, escalation: Escalation<'_>) -> (String, Option<Vec<u8>>) {
    match escalation {
        Escalation::None => (command.to_string(), None),
        Escalation::Sudo => (format!("sudo -H -n -- sh -c {}", quote(command)), None),
        Escalation::SudoWithPassword(secret) => {
            let mut input = secret.expose().as_bytes().to_vec();
            input.push(b'\n');
            (
                format!("sudo -H -S -p '' -- sh -c {}", quote(command)),
                Some(input),
            )
        }
    }
}

fn quote(word: &str) -> String {
    shell_escape::escape(Cow::Borrowed(word)).into_owned()
}

/// Create muster's known-hosts file (and its directory) with tight modes.
pub fn ensure_known_hosts(state_dir: &Path) -> Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::create_dir_all(state_dir)
        .with_context(|| format!("creating {}", state_dir.display()))?;
    std::fs::set_permissions(state_dir, std::fs::Permissions::from_mode(0o700))
        .with_context(|| format!("setting permissions on {}", state_dir.display()))?;

    let path = state_dir.join("known_hosts");
    if !path.exists() {
        std::fs::write(&path, "").with_context(|| format!("creating {}", path.display()))?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("setting permissions on {}", path.display()))?;
    }
    Ok(path)
}

// ── Unit tests ────────────────────────────────────────────────────────────────
