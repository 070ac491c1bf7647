//! Ad-hoc Ansible execution on the control node.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::application::ports::ManagementPing;
use crate::infra::command_runner::CommandRunner;

/// Ansible fetches facts before the ping module answers; allow it more
/// headroom than a single SSH command.
const PING_TIMEOUT: Duration = Duration::from_secs(60);

/// Runs `ansible -m ping` with a one-host inline inventory.
pub struct AnsiblePing<R: CommandRunner> {
    runner: R,
    known_hosts: PathBuf,
}

impl<R: CommandRunner> AnsiblePing<R> {
    pub fn new(runner: R, known_hosts: &Path) -> Self {
        Self {
            runner,
            known_hosts: known_hosts.to_path_buf(),
        }
    }
}

impl<R: CommandRunner> ManagementPing for AnsiblePing<R> {
    async fn ping(&self, address: &str, account: &str, key: &Path) -> Result<Output> {
        // The trailing comma makes the address an inline inventory instead
        // of a file path. The ssh options reuse muster's own host-key pins
        // so the ping cannot hang on an unknown-host prompt.
        let inline_inventory = format!("{address},");
        let key_arg = key.display().to_string();
        let ssh_args = format!(
            "-o StrictHostKeyChecking=accept-new -o UserKnownHostsFile={}",
            self.known_hosts.display()
        );
        let args = [
            "all",
            "-i",
            &inline_inventory,
            "-m",
            "ping",
            "-u",
            account,
            "--private-key",
            &key_arg,
            "--ssh-common-args",
            &ssh_args,
        ];
        self.runner
            .run_with_timeout("ansible", &args, PING_TIMEOUT)
            .await
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
