//! Results and history of an agent run

use std::fmt;

use crate::core::ToolCall;

/// Outcome of a single agent action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionResult {
    /// Whether this action completed the task
    pub is_done: bool,
    /// Text produced by the action
    pub extracted_content: Option<String>,
    /// Error message if the action failed
    pub error: Option<String>,
    /// Whether the content is fed back to the model on later steps
    pub include_in_memory: bool,
}

impl ActionResult {
    /// A successful, non-final action
    pub fn success(content: impl Into<String>, include_in_memory: bool) -> Self {
        Self {
            is_done: false,
            extracted_content: Some(content.into()),
            error: None,
            include_in_memory,
        }
    }

    /// The final result of the task
    pub fn done(content: impl Into<String>) -> Self {
        Self {
            is_done: true,
            extracted_content: Some(content.into()),
            error: None,
            include_in_memory: true,
        }
    }

    /// A failed action
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_done: false,
            extracted_content: None,
            error: Some(message.into()),
            include_in_memory: true,
        }
    }
}

/// One step of the agent loop
#[derive(Debug, Clone)]
pub struct AgentStep {
    /// Step number, starting at 1
    pub number: usize,
    /// Text the model produced alongside its actions
    pub thought: String,
    /// Actions the model requested
    pub actions: Vec<ToolCall>,
    /// Results of the actions that ran
    pub results: Vec<ActionResult>,
}

impl AgentStep {
    /// Whether any action in this step failed
    pub fn has_errors(&self) -> bool {
        self.results.iter().any(|r| r.error.is_some())
    }
}

/// Every step of one run, in order
#[derive(Debug, Clone, Default)]
pub struct AgentHistory {
    pub steps: Vec<AgentStep>,
}

impl AgentHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: AgentStep) {
        self.steps.push(step);
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Whether the run ended with a `done` result
    pub fn is_done(&self) -> bool {
        self.last_result().map(|r| r.is_done).unwrap_or(false)
    }

    /// The final result text, if the task was completed
    pub fn final_result(&self) -> Option<&str> {
        self.last_result()
            .filter(|r| r.is_done)
            .and_then(|r| r.extracted_content.as_deref())
    }

    /// All error messages, in order
    pub fn errors(&self) -> Vec<&str> {
        self.steps
            .iter()
            .flat_map(|s| s.results.iter())
            .filter_map(|r| r.error.as_deref())
            .collect()
    }

    fn last_result(&self) -> Option<&ActionResult> {
        self.steps.last().and_then(|s| s.results.last())
    }
}

impl fmt::Display for AgentHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Completed: {} ({} steps)",
            if self.is_done() { "yes" } else { "no" },
            self.step_count()
        )?;

        for step in &self.steps {
            writeln!(f, "\nStep {}:", step.number)?;
            if !step.thought.trim().is_empty() {
                writeln!(f, "  Thought: {}", first_line(&step.thought))?;
            }

            for (i, result) in step.results.iter().enumerate() {
                let action = step
                    .actions
                    .get(i)
                    .map(|a| format!("{} {}", a.name, a.arguments))
                    .unwrap_or_else(|| "answer".to_string());

                let outcome = match (&result.error, &result.extracted_content) {
                    (Some(e), _) => format!("error: {}", first_line(e)),
                    (None, Some(c)) => first_line(c),
                    (None, None) => "ok".to_string(),
                };

                writeln!(f, "  {} -> {}", action, outcome)?;
            }
        }

        if let Some(result) = self.final_result() {
            writeln!(f, "\nFinal result:\n{}", result)?;
        }

        let errors = self.errors();
        if !errors.is_empty() {
            writeln!(f, "\nErrors ({}):", errors.len())?;
            for e in errors {
                writeln!(f, "  - {}", e)?;
            }
        }

        Ok(())
    }
}

/// First line of `text`, cut to 120 characters
fn first_line(text: &str) -> String {
    let line = text.lines().next().unwrap_or("").trim();
    if line.chars().count() > 120 {
        format!("{}...", line.chars().take(120).collect::<String>())
    } else {
        line.to_string()
    }
}
