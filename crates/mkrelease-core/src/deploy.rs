//! Post-release deployment command

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

use tracing::{debug, info};

use crate::error::{ReleaseError, Result};

/// Output of a successful deploy run
#[derive(Debug, Clone)]
pub struct DeployOutput {
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
    /// Execution time in milliseconds
    pub duration_ms: u64,
}

/// A shell command run once after the release is published
#[derive(Debug, Clone)]
pub struct DeployCommand {
    /// The command line, passed to the platform shell
    pub command: String,
    /// Working directory
    pub cwd: PathBuf,
}

impl DeployCommand {
    /// Create a deploy command
    pub fn new(command: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            cwd: cwd.into(),
        }
    }

    /// Run the command, failing on a non-zero exit
    pub fn run(&self) -> Result<DeployOutput> {
        let start = Instant::now();
        info!(command = %self.command, cwd = %self.cwd.display(), "running deploy command");

        let shell = if cfg!(windows) { "cmd" } else { "sh" };
        let shell_arg = if cfg!(windows) { "/C" } else { "-c" };

        let output = Command::new(shell)
            .arg(shell_arg)
            .arg(&self.command)
            .current_dir(&self.cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| ReleaseError::Deployment {
                command: self.command.clone(),
                message: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            let detail = stderr.trim();
            let message = if detail.is_empty() {
                format!("exit code {}", code)
            } else {
                format!("exit code {}: {}", code, detail)
            };
            return Err(ReleaseError::Deployment {
                command: self.command.clone(),
                message,
            });
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        debug!(duration_ms, "deploy command finished");
        Ok(DeployOutput {
            stdout,
            stderr,
            duration_ms,
        })
    }
}
