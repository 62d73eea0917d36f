//! External command execution
//!
//! Collaborators that shell out (`aws`, `helm`) go through [`CommandRunner`], which
//! captures output, applies a timeout and turns non-zero exits into errors carrying
//! the command's stderr.

use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {status}: {stderr}")]
    Failed { program: String, status: i32, stderr: String },

    #[error("{program} timed out after {timeout_secs}s")]
    TimedOut { program: String, timeout_secs: u64 },
}

#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: String,
    timeout: Duration,
    envs: Vec<(String, String)>,
}

impl CommandRunner {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self { program: program.into(), timeout, envs: Vec::new() }
    }

    /// Set an environment variable for every invocation
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run with `args`, returning stdout on success
    #[instrument(skip(self, args), fields(program = %self.program))]
    pub async fn run(&self, args: &[String]) -> Result<String, CommandError> {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| CommandError::TimedOut {
                program: self.program.clone(),
                timeout_secs: self.timeout.as_secs(),
            })?
            .map_err(|source| CommandError::Spawn { program: self.program.clone(), source })?;

        if !output.status.success() {
            return Err(CommandError::Failed {
                program: self.program.clone(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(bytes = output.stdout.len(), "Command completed");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Build an owned argument vector from string slices
pub fn args<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh() -> CommandRunner {
        CommandRunner::new("sh", Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_captures_stdout() {
        let out = sh().run(&args(["-c", "echo hello"])).await.unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[tokio::test]
    async fn test_non_zero_exit_carries_stderr() {
        let err = sh().run(&args(["-c", "echo 'release: not found' >&2; exit 1"])).await.unwrap_err();
        match err {
            CommandError::Failed { status, stderr, .. } => {
                assert_eq!(status, 1);
                assert_eq!(stderr, "release: not found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let runner = CommandRunner::new("definitely-not-a-real-binary-xyz", Duration::from_secs(5));
        let err = runner.run(&[]).await.unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_timeout() {
        let runner = CommandRunner::new("sh", Duration::from_millis(100));
        let err = runner.run(&args(["-c", "sleep 5"])).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_env_passed_through() {
        let out = sh().env("EKS_MCP_TEST_VALUE", "42").run(&args(["-c", "echo $EKS_MCP_TEST_VALUE"])).await.unwrap();
        assert_eq!(out.trim(), "42");
    }
}
