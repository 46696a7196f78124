//! Browser Operator - type a task, watch a browser do it
//!
//! A web form where a natural-language task ("go to Gmail and compose an
//! email") is handed to an LLM-driven agent that operates a real browser
//! through agent-browser.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: LLM provider abstraction with an OpenAI-compatible client
//! - **Tools**: Browser session and the actions the model can call
//! - **Agent**: The step loop and the task-execution wrapper
//! - **UI**: The web form
//!
//! # Usage
//!
//! ```rust,no_run
//! use browser_operator::{BrowserOperator, Config};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load();
//!     let operator = BrowserOperator::from_config(&config).unwrap();
//!
//!     let report = operator.run_task("Go to YouTube and play music", false).await;
//!     println!("{}", report);
//! }
//! ```

pub mod agent;
pub mod core;
pub mod llm;
pub mod tools;
pub mod ui;

// Re-export commonly used items
pub use agent::{Agent, BrowserOperator};
pub use core::{Config, OperatorError, Result};
pub use ui::OperatorContext;
