//! Async external-process execution with deadlines.
//!
//! Everything muster runs on the control node (`ssh`, `ansible`) goes
//! through [`CommandRunner`], so adapters stay generic and tests can
//! substitute canned outputs without spawning processes.

use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tokio::process::Child;

/// Generic command execution with a deadline and guaranteed process kill.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a command with the runner's default deadline.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;

    /// Run a command with an explicit deadline.
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;

    /// Run a command with `input` piped to its stdin, under the default
    /// deadline. Stdin is closed after the write so line-oriented readers
    /// see EOF.
    async fn run_with_stdin(&self, program: &str, args: &[&str], input: &[u8]) -> Result<Output>;
}

/// Production [`CommandRunner`] on tokio.
///
/// A plain `tokio::time::timeout` around `.output().await` drops the future
/// but leaves the OS process running. This implementation pairs
/// `tokio::select!` with an explicit `child.kill()` so an expired deadline
/// always terminates the child.
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, self.timeout).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        let child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;
        reap_with_deadline(child, program, timeout).await
    }

    async fn run_with_stdin(&self, program: &str, args: &[&str], input: &[u8]) -> Result<Output> {
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        // Stdin is written from its own task so a child that fills its
        // stdout pipe before reading stdin cannot deadlock us.
        let stdin_handle = child.stdin.take();
        let payload = input.to_vec();
        let writer = tokio::spawn(async move {
            if let Some(mut stdin) = stdin_handle {
                use tokio::io::AsyncWriteExt;
                let _ = stdin.write_all(&payload).await;
                let _ = stdin.shutdown().await;
            }
        });

        let outcome = reap_with_deadline(child, program, self.timeout).await;
        // The child has exited (or been killed) here, so the writer either
        // finished or hit a closed pipe.
        let _ = writer.await;
        outcome
    }
}

/// Wait for `child` while draining both pipes concurrently. If the child
/// writes more than the OS pipe buffer and nothing reads, `wait()` never
/// resolves; the `tokio::join!` keeps both pipes flowing.
async fn reap_with_deadline(mut child: Child, program: &str, timeout: Duration) -> Result<Output> {
    let mut stdout_handle = child.stdout.take();
    let mut stderr_handle = child.stderr.take();
    tokio::select! {
        result = async {
            let (status, stdout, stderr) = tokio::join!(
                child.wait(),
                read_to_end(&mut stdout_handle),
                read_to_end(&mut stderr_handle),
            );
            Ok(Output {
                status: status.with_context(|| format!("waiting for {program}"))?,
                stdout,
                stderr,
            })
        } => result,
        () = tokio::time::sleep(timeout) => {
            let _ = child.kill().await;
            anyhow::bail!("{program} timed out after {}s", timeout.as_secs())
        }
    }
}

async fn read_to_end<R: AsyncReadExt + Unpin>(handle: &mut Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(reader) = handle {
        let _ = reader.read_to_end(&mut buf).await;
    }
    buf
}

// ── Unit tests ────────────────────────────────────────────────────────────────
