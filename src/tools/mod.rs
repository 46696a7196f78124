//! Tools module - browser session and the actions the agent can take
//!
//! Contains the agent-browser wrapper and the tool registry.

pub mod browser;
pub mod registry;

pub use registry::ToolRegistry;
