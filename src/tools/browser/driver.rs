//! Command drivers for the browser session
//!
//! A driver turns one browser command (`open <url>`, `click @e3`, ...) into
//! text output. The default driver shells out to the agent-browser CLI.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::core::config::BrowserConfig;
use crate::core::{OperatorError, Result};

/// Executes browser commands for a session
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Run one command and return its stdout
    async fn run(&self, args: &[&str]) -> Result<String>;
}

/// Executable name looked up on PATH
const AGENT_BROWSER: &str = "agent-browser";

/// Driver backed by the agent-browser CLI
pub struct AgentBrowserCli {
    /// Program to run
    program: String,
    /// Global flags passed before every command
    launch_args: Vec<String>,
    /// Per-command limit; the child is killed when it runs over
    timeout: Duration,
}

impl AgentBrowserCli {
    /// Create a driver for the given session configuration
    pub fn new(config: &BrowserConfig) -> Self {
        Self::with_program(AGENT_BROWSER, config)
    }

    /// Create a driver that runs `program` instead of `agent-browser`
    pub fn with_program(program: impl Into<String>, config: &BrowserConfig) -> Self {
        Self {
            program: program.into(),
            launch_args: Self::launch_args(config),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Global agent-browser flags derived from the session configuration
    pub fn launch_args(config: &BrowserConfig) -> Vec<String> {
        let mut args = vec!["--session".to_string(), config.session_name.clone()];

        if !config.headless {
            args.push("--headed".to_string());
        }

        if let Some(ref path) = config.executable_path {
            args.push("--executable-path".to_string());
            args.push(path.clone());
        }

        if !config.extra_args.is_empty() {
            args.push("--args".to_string());
            args.push(config.extra_args.join(","));
        }

        args
    }

    /// Check if the program is installed
    pub async fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl BrowserDriver for AgentBrowserCli {
    async fn run(&self, args: &[&str]) -> Result<String> {
        debug!(program = %self.program, command = ?args, "browser command");

        let mut command = Command::new(&self.program);
        command
            .args(&self.launch_args)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                OperatorError::browser(format!(
                    "{} {} timed out after {}ms",
                    self.program,
                    args.first().copied().unwrap_or_default(),
                    self.timeout.as_millis()
                ))
            })?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    OperatorError::AgentBrowserNotFound
                } else {
                    OperatorError::browser(format!("Failed to run {}: {}", self.program, e))
                }
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(OperatorError::browser(format!(
                "{} command failed: {}",
                self.program,
                stderr.trim()
            )))
        }
    }
}
