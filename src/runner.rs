use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Command;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Platform {
    Windows,
    MacOS,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOS
        } else {
            Platform::Linux
        }
    }
}

/// Privilege and working-directory context for a single command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    pub runas: Option<String>,
    pub cwd: Option<PathBuf>,
}

impl RunOptions {
    pub fn new(runas: Option<String>, cwd: Option<PathBuf>) -> Self {
        Self { runas, cwd }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub retcode: i32,
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
}

impl ExecutionResult {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            retcode: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(retcode: i32, stderr: impl Into<String>) -> Self {
        Self {
            retcode,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Runs a shell command line and captures its result.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    fn run_all(&self, command: &str, options: &RunOptions) -> Result<ExecutionResult>;
}

/// Executes commands through the platform shell.
pub struct ShellRunner {
    platform: Platform,
}

impl ShellRunner {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Program and arguments used to run `command`, wrapped in `su` for `runas`.
    pub fn shell_invocation(&self, command: &str, runas: Option<&str>) -> (String, Vec<String>) {
        match (self.platform, runas) {
            (Platform::Windows, _) => (
                "cmd".to_string(),
                vec!["/C".to_string(), command.to_string()],
            ),
            (_, Some(user)) => (
                "su".to_string(),
                vec![
                    "-s".to_string(),
                    "/bin/sh".to_string(),
                    "-c".to_string(),
                    command.to_string(),
                    user.to_string(),
                ],
            ),
            (_, None) => (
                "sh".to_string(),
                vec!["-c".to_string(), command.to_string()],
            ),
        }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new(Platform::current())
    }
}

impl CommandRunner for ShellRunner {
    fn run_all(&self, command: &str, options: &RunOptions) -> Result<ExecutionResult> {
        if self.platform == Platform::Windows && options.runas.is_some() {
            tracing::warn!("runas is not supported on Windows; running as current user");
        }

        let (program, args) = self.shell_invocation(command, options.runas.as_deref());
        tracing::debug!(program = %program, command = command, "Spawning shell");

        let mut cmd = Command::new(&program);
        cmd.args(&args);
        if let Some(cwd) = &options.cwd {
            cmd.current_dir(cwd);
        }

        let output = cmd
            .output()
            .with_context(|| format!("Failed to execute command: {command}"))?;

        Ok(ExecutionResult {
            retcode: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        })
    }
}
