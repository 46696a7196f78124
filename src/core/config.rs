//! Configuration management for the browser operator
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/browser-operator/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{OperatorError, Result};

/// Environment variable holding the API credential
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Whether the API credential is set and non-empty
pub fn api_key_present() -> bool {
    env::var(API_KEY_ENV)
        .map(|k| !k.trim().is_empty())
        .unwrap_or(false)
}

/// Chrome location used by default on macOS
const MACOS_CHROME_PATH: &str = "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome";

/// Main configuration for the operator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenAI-compatible API configuration
    pub openai: OpenAIConfig,
    /// Browser session configuration
    pub browser: BrowserConfig,
    /// Agent configuration
    pub agent: AgentConfig,
    /// Web UI configuration
    pub ui: UiConfig,
}

/// OpenAI-compatible API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAIConfig {
    /// Base URL of the API (without the `/chat/completions` suffix)
    pub base_url: String,
    /// Model used to plan browser actions
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Browser session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Session name for agent-browser
    pub session_name: String,
    /// Path to the Chrome executable (agent-browser's bundled browser if unset)
    pub executable_path: Option<String>,
    /// Whether to launch without a visible window
    pub headless: bool,
    /// Extra Chromium launch arguments
    pub extra_args: Vec<String>,
    /// Default timeout for browser operations in ms
    pub timeout_ms: u64,
}

/// Agent behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum steps per task
    /// Default: 25
    pub max_steps: usize,
    /// Consecutive failing steps before the run is abandoned
    /// Default: 3
    pub max_failures: usize,
    /// Attach a screenshot of the page to every planning request
    pub use_vision: bool,
    /// Save a screenshot of every step to `artifacts_dir`
    pub generate_artifacts: bool,
    /// Where step screenshots are written
    pub artifacts_dir: PathBuf,
    /// Whether to show debug output
    pub debug: bool,
    /// Extra instructions appended to the system prompt
    pub system_prompt: Option<String>,
}

/// Web UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Bind address
    pub host: String,
    /// Bind port (default: 7860)
    pub port: u16,
    /// Open the UI in the default browser after startup
    pub open_browser: bool,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            model: env::var("OPERATOR_MODEL").unwrap_or_else(|_| "gpt-4".to_string()),
            timeout_secs: 120,
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        let executable_path = env::var("OPERATOR_CHROME_PATH").ok().or_else(|| {
            cfg!(target_os = "macos").then(|| MACOS_CHROME_PATH.to_string())
        });
        let profile =
            env::var("OPERATOR_CHROME_PROFILE").unwrap_or_else(|_| "Profile 2".to_string());

        Self {
            session_name: "browser-operator".to_string(),
            executable_path,
            headless: false,
            extra_args: vec![format!("--profile-directory={}", profile)],
            timeout_ms: 30000,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: 25,
            max_failures: 3,
            use_vision: false,
            generate_artifacts: false,
            artifacts_dir: PathBuf::from("agent_history"),
            debug: env::var("OPERATOR_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            system_prompt: None,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            host: env::var("OPERATOR_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("OPERATOR_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(7860),
            open_browser: false,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("browser-operator")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    pub fn load() -> Self {
        match Self::load_from_file() {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!(error = %e, "using default configuration");
                Self::default()
            }
        }
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(OperatorError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| OperatorError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text; missing keys take their defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| OperatorError::config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration and return the path
    pub fn save_and_get_path(&self) -> Result<PathBuf> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).map_err(|e| {
                OperatorError::config(format!("Failed to create config dir: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| OperatorError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| OperatorError::config(format!("Failed to write config: {}", e)))?;

        Ok(config_path)
    }

    /// Full chat completions endpoint
    pub fn chat_completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.openai.base_url.trim_end_matches('/')
        )
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config)
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}

impl UiConfig {
    /// Get the socket address
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
