//! Agent step loop
//!
//! Drives one task to completion: asks the model for the next browser
//! actions, runs them against the session, and feeds the results back.
//! Implements a ReAct-style loop (Thought → Action → Observation).

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::agent::loop_state::AgentLoopState;
use crate::agent::views::{ActionResult, AgentHistory, AgentStep};
use crate::core::config::AgentConfig;
use crate::core::{Message, Result};
use crate::llm::{GenerateOptions, LLMProvider, LLMResponse};
use crate::tools::browser::Browser;
use crate::tools::ToolRegistry;

const SYSTEM_PROMPT: &str = r#"You are a browser automation agent. You complete the user's task by calling browser tools. Follow the ReAct pattern:
1. THINK about what you need to do next.
2. ACT by calling one or more tools.
3. OBSERVE the results in the next message and continue.

## Browser Tools
- `go_to_url`: Navigate to a URL. Returns a snapshot of the page.
- `snapshot`: Get interactive elements. Elements carry [ref=eN] tags.
- `click_element`: Click an element. Args: {"ref": "e8"}
- `input_text`: Type into an element. Args: {"ref": "e5", "text": "search query"}
- `get_text`: Read the text of an element.
- `send_keys`: Press a key, e.g. {"key": "Enter"}.
- `scroll`, `go_back`.
- `done`: Call this when the task is complete, with the result in `text`.

## CRITICAL: Element References
When a snapshot shows `link "Sign in" [ref=e12]`, use `{"ref": "e12"}`.
Refs change after navigation. Always use refs from the LATEST "Current Page".

## Rules
- Call `done` as soon as the task is complete.
- If an action fails, try a different approach instead of repeating it."#;

/// Agent behaviour for one run
#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// Attach a screenshot to every planning request
    pub use_vision: bool,
    /// Save a screenshot of every step
    pub generate_artifacts: bool,
    /// Where step screenshots go
    pub artifacts_dir: PathBuf,
    /// Maximum steps
    pub max_steps: usize,
    /// Consecutive failing steps before giving up
    pub max_failures: usize,
    /// Extra instructions for the system prompt
    pub extra_instructions: Option<String>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self::from(&AgentConfig::default())
    }
}

impl From<&AgentConfig> for AgentSettings {
    fn from(config: &AgentConfig) -> Self {
        Self {
            use_vision: config.use_vision,
            generate_artifacts: config.generate_artifacts,
            artifacts_dir: config.artifacts_dir.clone(),
            max_steps: config.max_steps,
            max_failures: config.max_failures,
            extra_instructions: config.system_prompt.clone(),
        }
    }
}

/// Agent bound to one task, one model and one browser session
pub struct Agent {
    task: String,
    model: String,
    llm: Arc<dyn LLMProvider>,
    browser: Arc<Browser>,
    tools: ToolRegistry,
    settings: AgentSettings,
}

impl Agent {
    /// Create an agent for `task`
    pub fn new(
        task: impl Into<String>,
        model: impl Into<String>,
        llm: Arc<dyn LLMProvider>,
        browser: Arc<Browser>,
        settings: AgentSettings,
    ) -> Self {
        Self {
            task: task.into(),
            model: model.into(),
            llm,
            tools: ToolRegistry::new(browser.clone()),
            browser,
            settings,
        }
    }

    /// The task this agent works on
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Run the task to completion
    ///
    /// The loop ends when the model calls `done` or answers without tools,
    /// after `max_steps` steps, or after `max_failures` consecutive failing
    /// steps. Model errors are returned; action errors are recorded in the
    /// history.
    pub async fn run(&self) -> Result<AgentHistory> {
        info!(
            task = %self.task,
            model = %self.model,
            provider = self.llm.name(),
            "starting agent run"
        );

        let mut state = AgentLoopState::new(self.settings.max_steps, self.settings.max_failures);
        let mut history = AgentHistory::new();

        if self.settings.generate_artifacts {
            tokio::fs::create_dir_all(&self.settings.artifacts_dir).await?;
        }

        while state.should_continue() {
            let number = state.step + 1;
            debug!(step = number, max = state.max_steps, "planning");

            let response = self.plan(&state).await?;
            if let Some(ref usage) = response.usage {
                debug!(step = number, tokens = usage.total_tokens, "model usage");
            }
            let step = self.act(number, response, &mut state).await;

            let failed = step.has_errors();
            history.push(step);
            state.finish_step(failed);

            if self.settings.generate_artifacts {
                self.save_step_screenshot(number).await;
            }
        }

        if state.done {
            info!(steps = state.step, "task completed");
        } else if state.failed_out() {
            warn!(steps = state.step, "stopped after repeated failures");
        } else {
            warn!(steps = state.step, "stopped at step limit without completing");
        }

        Ok(history)
    }

    /// Ask the model for the next actions
    async fn plan(&self, state: &AgentLoopState) -> Result<LLMResponse> {
        let system_prompt = match self.settings.extra_instructions {
            Some(ref extra) => format!("{}\n\n{}", SYSTEM_PROMPT, extra),
            None => SYSTEM_PROMPT.to_string(),
        };

        let mut user = Message::user(format!("Task: {}{}", self.task, state.format_context()));

        if self.settings.use_vision {
            match self.browser.screenshot(None).await {
                Ok(image) if !image.is_empty() => user = user.with_image(image),
                Ok(_) => {}
                Err(e) => debug!(error = %e, "no screenshot for this step"),
            }
        }

        let messages = vec![Message::system(system_prompt), user];
        let tools = self.tools.definitions();

        self.llm
            .chat_with_tools(
                &self.model,
                &messages,
                &tools,
                Some(GenerateOptions {
                    temperature: Some(0.1),
                    ..Default::default()
                }),
            )
            .await
    }

    /// Run the model's actions and record them
    async fn act(
        &self,
        number: usize,
        response: LLMResponse,
        state: &mut AgentLoopState,
    ) -> AgentStep {
        let mut results = Vec::with_capacity(response.tool_calls.len().max(1));

        if response.tool_calls.is_empty() {
            // A plain answer is the final answer
            let answer = if response.content.trim().is_empty() {
                "The model returned an empty response.".to_string()
            } else {
                response.content.clone()
            };
            let result = ActionResult::done(answer);
            state.record("answer", &result);
            results.push(result);
        } else {
            for call in &response.tool_calls {
                debug!(step = number, tool = %call.name, args = %call.arguments, "action");

                let result = self.tools.execute(call).await;
                if let Some(ref e) = result.error {
                    warn!(step = number, tool = %call.name, error = %e, "action failed");
                }

                state.record(&call.name, &result);
                let done = result.is_done;
                results.push(result);

                if done {
                    break;
                }
            }
        }

        AgentStep {
            number,
            thought: response.content,
            actions: response.tool_calls,
            results,
        }
    }

    async fn save_step_screenshot(&self, number: usize) {
        let path = self
            .settings
            .artifacts_dir
            .join(format!("step-{}.png", number));
        let path = path.to_string_lossy();

        if let Err(e) = self.browser.screenshot(Some(&path)).await {
            warn!(step = number, error = %e, "failed to save step screenshot");
        }
    }
}
