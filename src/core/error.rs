//! Custom error types for the browser operator
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for browser operator operations
#[derive(Error, Debug)]
pub enum OperatorError {
    /// Language model API errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Model rejected by the API
    #[error("Model '{0}' not available. Check the model name or your API access")]
    ModelNotFound(String),

    /// Browser automation errors
    #[error("Browser error: {0}")]
    Browser(String),

    /// Command issued against a session that was already closed
    #[error("Browser session '{0}' is closed")]
    SessionClosed(String),

    /// Agent-browser not installed
    #[error("agent-browser not found. Install with: npm install -g agent-browser && agent-browser install")]
    AgentBrowserNotFound,

    /// Tool execution errors
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for browser operator operations
pub type Result<T> = std::result::Result<T, OperatorError>;

impl OperatorError {
    /// Create an LLM error
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Create a browser error
    pub fn browser(msg: impl Into<String>) -> Self {
        Self::Browser(msg.into())
    }

    /// Create a tool execution error
    pub fn tool(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
