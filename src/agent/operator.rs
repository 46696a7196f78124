//! Task-execution wrapper
//!
//! [`BrowserOperator`] owns the browser session and turns one task
//! description into one report string. It never fails: errors come back as
//! text starting with `Error:`.

use std::sync::Arc;
use tracing::{info, warn};

use crate::agent::orchestrator::{Agent, AgentSettings};
use crate::agent::views::AgentHistory;
use crate::core::{Config, Result};
use crate::llm::{LLMProvider, OpenAIClient};
use crate::tools::browser::Browser;

/// Runs tasks against a single browser session
///
/// The session is opened when the operator is built and closed at the end of
/// every [`run_task`](Self::run_task). A second task on the same operator
/// therefore runs against a closed session and reports a session-closed
/// error.
pub struct BrowserOperator {
    browser: Arc<Browser>,
    llm: Arc<dyn LLMProvider>,
    model: String,
    settings: AgentSettings,
}

impl BrowserOperator {
    /// Build an operator with the OpenAI client and the agent-browser session
    pub fn from_config(config: &Config) -> Result<Self> {
        let browser = Arc::new(Browser::new(config.browser.clone()));
        let llm: Arc<dyn LLMProvider> = Arc::new(OpenAIClient::from_config(config)?);

        Ok(Self::new(
            browser,
            llm,
            config.openai.model.clone(),
            AgentSettings::from(&config.agent),
        ))
    }

    /// Build an operator from explicit parts
    pub fn new(
        browser: Arc<Browser>,
        llm: Arc<dyn LLMProvider>,
        model: impl Into<String>,
        settings: AgentSettings,
    ) -> Self {
        Self {
            browser,
            llm,
            model: model.into(),
            settings,
        }
    }

    /// The session this operator owns
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Run `task` and describe the outcome
    ///
    /// `headless` is accepted for the UI's sake but not applied: the session
    /// keeps the launch mode it was built with.
    ///
    /// Failures read `Error: {error}` followed by a `Task: {task}` line, so
    /// every report names its task. The session is closed on every exit path,
    /// including when this future is dropped before it completes.
    pub async fn run_task(&self, task: &str, headless: bool) -> String {
        if headless != self.browser.is_headless() {
            info!(
                requested = headless,
                session = self.browser.is_headless(),
                "headless flag is not applied to the existing session"
            );
        }

        let guard = CloseOnDrop::new(self.browser.clone());
        let outcome = self.execute(task).await;
        guard.close().await;

        match outcome {
            Ok(history) => format!("Task: {}\n\nExecution Results:\n{}", task, history),
            Err(e) => {
                warn!(task = %task, error = %e, "task failed");
                format!("Error: {}\n\nTask: {}", e, task)
            }
        }
    }

    async fn execute(&self, task: &str) -> Result<AgentHistory> {
        let agent = Agent::new(
            task,
            self.model.clone(),
            self.llm.clone(),
            self.browser.clone(),
            self.settings.clone(),
        );
        agent.run().await
    }
}

/// Closes the session when a run is abandoned before it finishes
struct CloseOnDrop {
    browser: Option<Arc<Browser>>,
}

impl CloseOnDrop {
    fn new(browser: Arc<Browser>) -> Self {
        Self {
            browser: Some(browser),
        }
    }

    async fn close(mut self) {
        if let Some(browser) = self.browser.take() {
            browser.close().await;
        }
    }
}

impl Drop for CloseOnDrop {
    fn drop(&mut self) {
        if let Some(browser) = self.browser.take() {
            warn!("task cancelled before completion, closing the browser session");
            browser.close_detached();
        }
    }
}
