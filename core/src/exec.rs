use std::io;
use std::path::Path;
use std::process::ExitStatus;
use std::process::Stdio;
use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;

/// What is known about a finished compiler process.
///
/// Wine exits non-zero even when MetaEditor compiled successfully, and
/// neither stream carries real diagnostics, so none of this decides whether
/// a compilation succeeded. Only the log file does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessExit {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub duration: Duration,
}

/// Launches a shell command line and waits for it to terminate.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs `command` with `cwd` as the working directory. An `Err` means
    /// the process could not be started at all.
    async fn run(&self, command: &str, cwd: &Path) -> io::Result<ProcessExit>;
}

/// Runs commands through the platform shell: `/bin/sh -c` on Unix and
/// `cmd.exe /d /s /c` on Windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellProcessRunner;

#[async_trait]
impl ProcessRunner for ShellProcessRunner {
    async fn run(&self, command: &str, cwd: &Path) -> io::Result<ProcessExit> {
        let start = Instant::now();
        let mut cmd = shell_command(command);
        cmd.current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!("spawning `{command}` in {}", cwd.display());
        let child = cmd.spawn().inspect_err(|err| {
            tracing::error!("failed to spawn compiler: {err}");
        })?;

        // No timeout: a hung compiler keeps this future pending.
        let output = child.wait_with_output().await?;
        let duration = start.elapsed();

        log_discarded_output(&output.status, &output.stdout, &output.stderr);
        Ok(ProcessExit {
            exit_code: output.status.code(),
            duration,
        })
    }
}

#[cfg(not(windows))]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("/bin/sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let comspec = std::env::var("ComSpec").unwrap_or_else(|_| "cmd.exe".to_string());
    let mut cmd = Command::new(comspec);
    // `/s` strips exactly one pair of outer quotes, leaving the quoted paths
    // inside intact.
    cmd.raw_arg(format!("/d /s /c \"{command}\""));
    cmd
}

fn log_discarded_output(status: &ExitStatus, stdout: &[u8], stderr: &[u8]) {
    tracing::debug!(
        "compiler process exited with {status} ({} bytes stdout, {} bytes stderr)",
        stdout.len(),
        stderr.len()
    );
    if !stdout.is_empty() {
        tracing::trace!("stdout: {}", String::from_utf8_lossy(stdout));
    }
    if !stderr.is_empty() {
        tracing::trace!("stderr: {}", String::from_utf8_lossy(stderr));
    }
}
