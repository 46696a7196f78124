//! Test doubles for the model and the browser driver
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use browser_operator::agent::{AgentSettings, BrowserOperator};
use browser_operator::core::config::BrowserConfig;
use browser_operator::core::{Message, OperatorError, Result, ToolCall, ToolDefinition};
use browser_operator::llm::{GenerateOptions, LLMProvider, LLMResponse};
use browser_operator::tools::browser::{Browser, BrowserDriver};

/// One scripted model turn
pub enum Turn {
    Reply(LLMResponse),
    Fail(String),
}

impl Turn {
    pub fn tools(calls: Vec<(&str, serde_json::Value)>) -> Self {
        Turn::Reply(LLMResponse {
            tool_calls: calls
                .into_iter()
                .map(|(name, args)| ToolCall::new(name, args))
                .collect(),
            model: "scripted".to_string(),
            ..Default::default()
        })
    }

    pub fn text(content: &str) -> Self {
        Turn::Reply(LLMResponse {
            content: content.to_string(),
            model: "scripted".to_string(),
            ..Default::default()
        })
    }
}

/// Model that replays a fixed script and records what it was sent
#[derive(Default)]
pub struct ScriptedLlm {
    turns: Mutex<VecDeque<Turn>>,
    pub requests: Mutex<Vec<Vec<Message>>>,
    /// How long each answer takes
    delay: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedLlm {
    pub fn new(turns: Vec<Turn>) -> Arc<Self> {
        Self::slow(turns, Duration::ZERO)
    }

    /// Like `new`, but every answer takes `delay`
    pub fn slow(turns: Vec<Turn>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            turns: Mutex::new(turns.into()),
            delay,
            ..Default::default()
        })
    }

    /// Most requests that were ever being answered at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// User message of the n-th request
    pub fn user_prompt(&self, n: usize) -> String {
        self.requests.lock().unwrap()[n][1].content.clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedLlm {
    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        self.chat_with_tools(model, messages, &[], options).await
    }

    async fn chat_with_tools(
        &self,
        _model: &str,
        messages: &[Message],
        _tools: &[ToolDefinition],
        _options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        self.requests.lock().unwrap().push(messages.to_vec());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let turn = self.turns.lock().unwrap().pop_front();
        match turn {
            Some(Turn::Reply(response)) => Ok(response),
            Some(Turn::Fail(message)) => Err(OperatorError::llm(message)),
            None => Ok(LLMResponse {
                content: "script exhausted".to_string(),
                ..Default::default()
            }),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Driver that answers like agent-browser and records every command
#[derive(Default)]
pub struct FakeDriver {
    pub commands: Mutex<Vec<String>>,
    /// Commands whose first word matches fail
    pub failing: Vec<&'static str>,
}

impl FakeDriver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(commands: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            failing: commands,
            ..Default::default()
        })
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserDriver for FakeDriver {
    async fn run(&self, args: &[&str]) -> Result<String> {
        self.commands.lock().unwrap().push(args.join(" "));

        if self.failing.contains(&args[0]) {
            return Err(OperatorError::browser(format!("{} failed", args[0])));
        }

        Ok(match args[0] {
            "snapshot" => serde_json::json!({
                "success": true,
                "data": {
                    "snapshot": "- textbox \"Search\" [ref=e1]\n- button \"Go\" [ref=e2]",
                    "refs": {
                        "e1": {"role": "textbox", "name": "Search"},
                        "e2": {"role": "button", "name": "Go"}
                    }
                }
            })
            .to_string(),
            "get" => "Rust is a systems programming language\n".to_string(),
            "screenshot" => "iVBORw0KGgo=".to_string(),
            _ => String::new(),
        })
    }
}

pub fn browser_config() -> BrowserConfig {
    BrowserConfig {
        session_name: "test-session".to_string(),
        executable_path: None,
        headless: false,
        extra_args: vec!["--profile-directory=Profile 2".to_string()],
        timeout_ms: 1000,
    }
}

pub fn browser(driver: Arc<FakeDriver>) -> Arc<Browser> {
    Arc::new(Browser::with_driver(browser_config(), driver))
}

pub fn settings() -> AgentSettings {
    AgentSettings {
        use_vision: false,
        generate_artifacts: false,
        artifacts_dir: std::env::temp_dir().join("browser-operator-tests"),
        max_steps: 10,
        max_failures: 3,
        extra_instructions: None,
    }
}

pub fn operator(llm: Arc<ScriptedLlm>, driver: Arc<FakeDriver>) -> BrowserOperator {
    BrowserOperator::new(browser(driver), llm, "gpt-4", settings())
}
