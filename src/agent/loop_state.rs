//! Agent loop state management
//!
//! Tracks the state of the step loop: the action memory fed back to the
//! model, the latest page snapshot, and the failure counter.

use crate::agent::views::ActionResult;

/// State of the agent step loop
#[derive(Debug, Clone)]
pub struct AgentLoopState {
    /// Steps completed so far
    pub step: usize,
    /// Maximum allowed steps
    pub max_steps: usize,
    /// Consecutive steps with at least one failed action
    pub consecutive_failures: usize,
    /// Maximum consecutive failing steps
    pub max_failures: usize,
    /// Action history fed back to the model
    pub memory: Vec<String>,
    /// Most recent page snapshot
    pub page_state: Option<String>,
    /// Whether the task has been completed
    pub done: bool,
}

impl AgentLoopState {
    /// Create a new loop state
    pub fn new(max_steps: usize, max_failures: usize) -> Self {
        Self {
            step: 0,
            max_steps,
            consecutive_failures: 0,
            max_failures,
            memory: Vec::new(),
            page_state: None,
            done: false,
        }
    }

    /// Check if the loop should continue
    pub fn should_continue(&self) -> bool {
        !self.done && self.step < self.max_steps && self.consecutive_failures < self.max_failures
    }

    /// Record the result of one action
    pub fn record(&mut self, action: &str, result: &ActionResult) {
        if let Some(ref error) = result.error {
            self.memory.push(format!("{}: error: {}", action, error));
            return;
        }

        if result.is_done {
            self.done = true;
        }

        match (&result.extracted_content, result.include_in_memory) {
            (Some(content), true) => self.memory.push(format!("{}: {}", action, content)),
            (Some(content), false) => {
                self.page_state = Some(content.clone());
                self.memory.push(format!("{}: ok", action));
            }
            (None, _) => self.memory.push(format!("{}: ok", action)),
        }
    }

    /// Close out a step
    pub fn finish_step(&mut self, failed: bool) {
        self.step += 1;
        if failed {
            self.consecutive_failures += 1;
        } else {
            self.consecutive_failures = 0;
        }
    }

    /// Whether the loop stopped because of repeated failures
    pub fn failed_out(&self) -> bool {
        self.consecutive_failures >= self.max_failures
    }

    /// Format memory and page state for inclusion in the next prompt
    pub fn format_context(&self) -> String {
        let mut output = String::new();

        if !self.memory.is_empty() {
            output.push_str("\n\n## Action History\n");
            for (i, entry) in self.memory.iter().enumerate() {
                output.push_str(&format!("{}. {}\n", i + 1, entry));
            }
        }

        if let Some(ref page) = self.page_state {
            output.push_str("\n## Current Page\n");
            output.push_str(page);
            output.push('\n');
        }

        output
    }
}
