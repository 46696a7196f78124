//! Step loop behaviour against a scripted model and a fake browser

mod common;

use browser_operator::agent::{Agent, AgentSettings};
use browser_operator::OperatorError;
use common::{browser, settings, FakeDriver, ScriptedLlm, Turn};
use serde_json::json;
use std::sync::Arc;

fn agent(llm: Arc<ScriptedLlm>, driver: Arc<FakeDriver>, settings: AgentSettings) -> Agent {
    Agent::new("Find the Rust homepage", "gpt-4", llm, browser(driver), settings)
}

#[tokio::test]
async fn stops_when_model_calls_done() {
    let llm = ScriptedLlm::new(vec![
        Turn::tools(vec![("go_to_url", json!({"url": "rust-lang.org"}))]),
        Turn::tools(vec![("done", json!({"text": "Found it"}))]),
        Turn::text("never reached"),
    ]);
    let driver = FakeDriver::new();

    let history = agent(llm.clone(), driver.clone(), settings()).run().await.unwrap();

    assert!(history.is_done());
    assert_eq!(history.step_count(), 2);
    assert_eq!(history.final_result(), Some("Found it"));
    assert_eq!(llm.request_count(), 2);
    assert_eq!(driver.commands()[0], "open https://rust-lang.org/");
}

#[tokio::test]
async fn plain_answer_ends_the_run() {
    let llm = ScriptedLlm::new(vec![Turn::text("The page says hello")]);

    let history = agent(llm, FakeDriver::new(), settings()).run().await.unwrap();

    assert!(history.is_done());
    assert_eq!(history.step_count(), 1);
    assert_eq!(history.final_result(), Some("The page says hello"));
}

#[tokio::test]
async fn empty_answer_is_reported() {
    let llm = ScriptedLlm::new(vec![Turn::text("   ")]);

    let history = agent(llm, FakeDriver::new(), settings()).run().await.unwrap();

    assert_eq!(
        history.final_result(),
        Some("The model returned an empty response.")
    );
}

#[tokio::test]
async fn stops_at_step_limit() {
    let turns = (0..5)
        .map(|_| Turn::tools(vec![("scroll", json!({"direction": "down"}))]))
        .collect();
    let llm = ScriptedLlm::new(turns);
    let mut settings = settings();
    settings.max_steps = 3;

    let history = agent(llm.clone(), FakeDriver::new(), settings).run().await.unwrap();

    assert!(!history.is_done());
    assert_eq!(history.step_count(), 3);
    assert_eq!(llm.request_count(), 3);
}

#[tokio::test]
async fn stops_after_consecutive_failures() {
    let turns = (0..5)
        .map(|_| Turn::tools(vec![("click_element", json!({"ref": "e9"}))]))
        .collect();
    let llm = ScriptedLlm::new(turns);
    let driver = FakeDriver::failing(vec!["click"]);

    let history = agent(llm, driver, settings()).run().await.unwrap();

    assert!(!history.is_done());
    assert_eq!(history.step_count(), 3);
    assert_eq!(history.errors().len(), 3);
    assert!(history.to_string().contains("Errors (3):"));
}

#[tokio::test]
async fn action_results_are_fed_back() {
    let llm = ScriptedLlm::new(vec![
        Turn::tools(vec![("get_text", json!({"ref": "e1"}))]),
        Turn::tools(vec![("done", json!({"text": "ok"}))]),
    ]);

    agent(llm.clone(), FakeDriver::new(), settings()).run().await.unwrap();

    let first = llm.user_prompt(0);
    let second = llm.user_prompt(1);
    assert!(first.starts_with("Task: Find the Rust homepage"));
    assert!(!first.contains("## Action History"));
    assert!(second.contains("1. get_text: Rust is a systems programming language"));
}

#[tokio::test]
async fn snapshots_become_current_page_not_history() {
    let llm = ScriptedLlm::new(vec![
        Turn::tools(vec![("snapshot", json!({}))]),
        Turn::tools(vec![("done", json!({"text": "ok"}))]),
    ]);

    agent(llm.clone(), FakeDriver::new(), settings()).run().await.unwrap();

    let second = llm.user_prompt(1);
    assert!(second.contains("1. snapshot: ok"));
    assert!(second.contains("## Current Page\n- textbox \"Search\" [ref=e1]"));
}

#[tokio::test]
async fn model_errors_propagate() {
    let llm = ScriptedLlm::new(vec![Turn::Fail("rate limited".to_string())]);

    let err = agent(llm, FakeDriver::new(), settings()).run().await.unwrap_err();

    assert!(matches!(err, OperatorError::Llm(_)));
    assert!(err.to_string().contains("rate limited"));
}

#[tokio::test]
async fn vision_attaches_screenshot() {
    let llm = ScriptedLlm::new(vec![Turn::text("done")]);
    let mut settings = settings();
    settings.use_vision = true;

    agent(llm.clone(), FakeDriver::new(), settings).run().await.unwrap();

    let requests = llm.requests.lock().unwrap();
    assert_eq!(requests[0][1].images, vec!["iVBORw0KGgo=".to_string()]);
}

#[tokio::test]
async fn artifacts_are_saved_per_step() {
    let dir = std::env::temp_dir().join("browser-operator-artifacts-test");
    let llm = ScriptedLlm::new(vec![
        Turn::tools(vec![("scroll", json!({"direction": "down"}))]),
        Turn::text("finished"),
    ]);
    let driver = FakeDriver::new();
    let mut settings = settings();
    settings.generate_artifacts = true;
    settings.artifacts_dir = dir.clone();

    agent(llm, driver.clone(), settings).run().await.unwrap();

    let screenshots: Vec<String> = driver
        .commands()
        .into_iter()
        .filter(|c| c.starts_with("screenshot"))
        .collect();
    assert_eq!(screenshots.len(), 2);
    assert!(screenshots[0].ends_with("step-1.png"));
    assert!(screenshots[1].ends_with("step-2.png"));
    assert!(dir.exists());
}
