//! Agent module - the step loop and the task-execution wrapper
//!
//! Contains the agent that plans browser actions with the LLM and the
//! operator that runs one task per call.

pub mod loop_state;
pub mod operator;
pub mod orchestrator;
pub mod views;

pub use loop_state::AgentLoopState;
pub use operator::BrowserOperator;
pub use orchestrator::{Agent, AgentSettings};
pub use views::{ActionResult, AgentHistory, AgentStep};
