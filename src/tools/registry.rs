//! Tool registry - the browser actions the model may call
//!
//! Central hub for registering tools and routing tool calls to the browser
//! session. Every call produces an [`ActionResult`]; failures are reported in
//! the result instead of aborting the run.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::agent::ActionResult;
use crate::core::{OperatorError, Result, ToolCall, ToolDefinition, ToolResult};
use crate::tools::browser::Browser;

/// Registry of available tools
pub struct ToolRegistry {
    /// Tool definitions indexed by name
    definitions: BTreeMap<String, ToolDefinition>,
    /// Browser session the tools act on
    browser: Arc<Browser>,
}

impl ToolRegistry {
    /// Create a registry with the browser actions and `done`
    pub fn new(browser: Arc<Browser>) -> Self {
        let mut registry = Self {
            definitions: BTreeMap::new(),
            browser,
        };

        registry.register_browser_tools();
        registry.register_control_tools();

        registry
    }

    /// Register browser automation tools
    fn register_browser_tools(&mut self) {
        self.register(ToolDefinition::function(
            "go_to_url",
            "Navigate to a URL and get the page structure for analysis",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "The URL to navigate to"
                    }
                },
                "required": ["url"]
            }),
        ));

        self.register(ToolDefinition::function(
            "click_element",
            "Click an element on the page by its ref from the snapshot",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "ref": {
                        "type": "string",
                        "description": "Element ref from snapshot (e.g., e1, e2)"
                    }
                },
                "required": ["ref"]
            }),
        ));

        self.register(ToolDefinition::function(
            "input_text",
            "Fill text into an input field by its ref",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "ref": {
                        "type": "string",
                        "description": "Element ref from snapshot"
                    },
                    "text": {
                        "type": "string",
                        "description": "Text to enter"
                    }
                },
                "required": ["ref", "text"]
            }),
        ));

        self.register(ToolDefinition::function(
            "get_text",
            "Get text content from an element",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "ref": {
                        "type": "string",
                        "description": "Element ref from snapshot"
                    }
                },
                "required": ["ref"]
            }),
        ));

        self.register(ToolDefinition::function(
            "send_keys",
            "Press a keyboard key such as Enter, Tab or Escape",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "key": {
                        "type": "string",
                        "description": "Key to press"
                    }
                },
                "required": ["key"]
            }),
        ));

        self.register(ToolDefinition::function(
            "scroll",
            "Scroll the page",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "direction": {
                        "type": "string",
                        "enum": ["up", "down", "left", "right"],
                        "description": "Scroll direction"
                    },
                    "pixels": {
                        "type": "integer",
                        "description": "Distance in pixels (optional)"
                    }
                },
                "required": ["direction"]
            }),
        ));

        self.register(ToolDefinition::function(
            "go_back",
            "Go back to the previous page",
            serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        ));

        self.register(ToolDefinition::function(
            "snapshot",
            "Get the current page accessibility tree with interactive element refs",
            serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        ));
    }

    /// Register tools that steer the agent itself
    fn register_control_tools(&mut self) {
        self.register(ToolDefinition::function(
            "done",
            "Finish the task and report the result to the user",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": {
                        "type": "string",
                        "description": "Summary of what was accomplished or the requested information"
                    }
                },
                "required": ["text"]
            }),
        ));
    }

    /// Register a tool definition
    pub fn register(&mut self, definition: ToolDefinition) {
        let name = definition.function.name.clone();
        self.definitions.insert(name, definition);
    }

    /// Get all tool definitions, ordered by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.definitions.values().cloned().collect()
    }

    /// Check whether a tool is registered
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Execute a tool call
    pub async fn execute(&self, tool_call: &ToolCall) -> ActionResult {
        if !self.contains(&tool_call.name) {
            return ActionResult::error(format!("Unknown tool: {}", tool_call.name));
        }

        if tool_call.name == "done" {
            let text = tool_call.get_string("text").unwrap_or_default();
            return ActionResult::done(text);
        }

        match self.execute_browser_tool(tool_call).await {
            Ok(result) => {
                // Snapshots describe the current page only; they are not kept
                // in the action history.
                let page_state = matches!(
                    tool_call.name.as_str(),
                    "go_to_url" | "click_element" | "go_back" | "snapshot"
                );
                ActionResult::success(result.output, !page_state)
            }
            Err(e) => ActionResult::error(e.to_string()),
        }
    }

    /// Execute a browser tool
    async fn execute_browser_tool(&self, tool_call: &ToolCall) -> Result<ToolResult> {
        let browser = &self.browser;

        match tool_call.name.as_str() {
            "go_to_url" => {
                let url = normalize_url(&required(tool_call, "url")?)?;
                browser.open(&url).await
            }
            "click_element" => browser.click(&required(tool_call, "ref")?).await,
            "input_text" => {
                let ref_id = required(tool_call, "ref")?;
                let text = tool_call.get_string("text").unwrap_or_default();
                browser.fill(&ref_id, &text).await
            }
            "get_text" => browser.get_text(&required(tool_call, "ref")?).await,
            "send_keys" => browser.press(&required(tool_call, "key")?).await,
            "scroll" => {
                let direction = required(tool_call, "direction")?;
                browser.scroll(&direction, tool_call.get_u32("pixels")).await
            }
            "go_back" => browser.back().await,
            "snapshot" => browser.snapshot().await,
            _ => Err(OperatorError::tool(format!(
                "Unknown browser tool: {}",
                tool_call.name
            ))),
        }
    }
}

fn required(tool_call: &ToolCall, key: &str) -> Result<String> {
    tool_call
        .get_string(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            OperatorError::tool(format!(
                "{} requires the '{}' argument",
                tool_call.name, key
            ))
        })
}

/// Add a scheme to bare hosts and reject URLs that don't parse
fn normalize_url(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let candidate = if raw.contains("://") || raw.starts_with("about:") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    url::Url::parse(&candidate)
        .map(|u| u.to_string())
        .map_err(|e| OperatorError::tool(format!("Invalid URL '{}': {}", raw, e)))
}
