//! Browser session handle
//!
//! One launched, controllable browser. Every command goes through the
//! session's driver; once the session is closed every command fails with
//! [`OperatorError::SessionClosed`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::config::BrowserConfig;
use crate::core::{OperatorError, Result, ToolResult};
use crate::tools::browser::driver::{AgentBrowserCli, BrowserDriver};
use crate::tools::browser::snapshot::Snapshot;

/// Handle to a browser session
pub struct Browser {
    config: BrowserConfig,
    driver: Arc<dyn BrowserDriver>,
    closed: AtomicBool,
}

impl Browser {
    /// Open a session driven by the agent-browser CLI
    pub fn new(config: BrowserConfig) -> Self {
        let driver = Arc::new(AgentBrowserCli::new(&config));
        Self::with_driver(config, driver)
    }

    /// Open a session with a custom driver
    pub fn with_driver(config: BrowserConfig, driver: Arc<dyn BrowserDriver>) -> Self {
        debug!(
            session = %config.session_name,
            headless = config.headless,
            "browser session opened"
        );
        Self {
            config,
            driver,
            closed: AtomicBool::new(false),
        }
    }

    /// Session configuration the browser was launched with
    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// Whether the session launches without a window
    pub fn is_headless(&self) -> bool {
        self.config.headless
    }

    /// Whether the session has been closed
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn run_command(&self, args: &[&str]) -> Result<String> {
        if self.is_closed() {
            return Err(OperatorError::SessionClosed(
                self.config.session_name.clone(),
            ));
        }
        self.driver.run(args).await
    }

    async fn run_json_command(&self, args: &[&str]) -> Result<String> {
        let mut full_args: Vec<&str> = args.to_vec();
        full_args.push("--json");
        self.run_command(&full_args).await
    }

    /// Navigate to a URL and return the resulting page snapshot
    pub async fn open(&self, url: &str) -> Result<ToolResult> {
        self.run_command(&["open", url]).await?;

        if let Err(e) = self.run_command(&["wait", "--load", "networkidle"]).await {
            debug!(error = %e, "wait for network idle failed");
        }

        let snapshot = self.snapshot_text().await?;
        Ok(ToolResult::new(
            "go_to_url",
            format!("Navigated to {}. Page snapshot:\n{}", url, snapshot),
        ))
    }

    /// Click an element by ref
    pub async fn click(&self, ref_id: &str) -> Result<ToolResult> {
        let element = normalize_ref(ref_id);
        self.run_command(&["click", &element]).await?;

        let snapshot = self.snapshot_text().await?;
        Ok(ToolResult::new(
            "click_element",
            format!("Clicked {}. Updated page:\n{}", element, snapshot),
        ))
    }

    /// Fill an input field
    pub async fn fill(&self, ref_id: &str, text: &str) -> Result<ToolResult> {
        let element = normalize_ref(ref_id);
        self.run_command(&["fill", &element, text]).await?;

        Ok(ToolResult::new(
            "input_text",
            format!("Filled {} with '{}'", element, text),
        ))
    }

    /// Get text from an element
    pub async fn get_text(&self, ref_id: &str) -> Result<ToolResult> {
        let element = normalize_ref(ref_id);
        let output = self.run_command(&["get", "text", &element]).await?;

        Ok(ToolResult::new("get_text", output.trim()))
    }

    /// Press a key
    pub async fn press(&self, key: &str) -> Result<ToolResult> {
        self.run_command(&["press", key]).await?;
        Ok(ToolResult::new("send_keys", format!("Pressed {}", key)))
    }

    /// Scroll the page
    pub async fn scroll(&self, direction: &str, pixels: Option<u32>) -> Result<ToolResult> {
        let mut args = vec!["scroll", direction];
        let px_str;

        if let Some(px) = pixels {
            px_str = px.to_string();
            args.push(&px_str);
        }

        self.run_command(&args).await?;
        Ok(ToolResult::new("scroll", format!("Scrolled {}", direction)))
    }

    /// Go back in history
    pub async fn back(&self) -> Result<ToolResult> {
        self.run_command(&["back"]).await?;

        let snapshot = self.snapshot_text().await?;
        Ok(ToolResult::new(
            "go_back",
            format!("Went back. Page snapshot:\n{}", snapshot),
        ))
    }

    /// Get an interactive page snapshot
    pub async fn snapshot(&self) -> Result<ToolResult> {
        let snapshot = self.snapshot_text().await?;
        Ok(ToolResult::new("snapshot", snapshot))
    }

    async fn snapshot_text(&self) -> Result<String> {
        let output = self.run_json_command(&["snapshot", "-i"]).await?;

        match serde_json::from_str::<Snapshot>(&output) {
            Ok(snapshot) => {
                debug!(elements = snapshot.count_elements(), "page snapshot");
                Ok(snapshot.render())
            }
            Err(_) => Ok(output),
        }
    }

    /// Take a screenshot; without a path the PNG comes back base64-encoded
    pub async fn screenshot(&self, path: Option<&str>) -> Result<String> {
        let mut args = vec!["screenshot"];

        if let Some(p) = path {
            args.push(p);
        }

        self.run_command(&args).await.map(|s| s.trim().to_string())
    }

    /// Close the session
    ///
    /// Idempotent. The handle is marked closed even if the driver fails to
    /// shut the browser down.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        shutdown(self.driver.as_ref(), &self.config.session_name).await;
    }

    /// Mark the session closed now and shut the browser down in the background
    ///
    /// For paths that cannot await, such as a run dropped mid-flight.
    pub fn close_detached(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        let driver = self.driver.clone();
        let session = self.config.session_name.clone();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { shutdown(driver.as_ref(), &session).await });
            }
            Err(_) => warn!(session = %session, "no runtime left to close the browser"),
        }
    }
}

async fn shutdown(driver: &dyn BrowserDriver, session: &str) {
    match driver.run(&["close"]).await {
        Ok(_) => debug!(session = %session, "browser session closed"),
        Err(e) => warn!(
            session = %session,
            error = %e,
            "failed to close browser cleanly"
        ),
    }
}

/// Element refs are passed to agent-browser with an `@` prefix
fn normalize_ref(ref_id: &str) -> String {
    let trimmed = ref_id.trim();
    if trimmed.starts_with('@') {
        trimmed.to_string()
    } else {
        format!("@{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingDriver {
        commands: Mutex<Vec<String>>,
        fail_close: bool,
    }

    #[async_trait::async_trait]
    impl BrowserDriver for RecordingDriver {
        async fn run(&self, args: &[&str]) -> Result<String> {
            self.commands.lock().unwrap().push(args.join(" "));
            if args[0] == "close" && self.fail_close {
                return Err(OperatorError::browser("no browser running"));
            }
            Ok(String::new())
        }
    }

    fn config() -> BrowserConfig {
        BrowserConfig {
            session_name: "test-session".to_string(),
            executable_path: None,
            headless: false,
            extra_args: Vec::new(),
            timeout_ms: 1000,
        }
    }

    #[test]
    fn test_normalize_ref() {
        assert_eq!(normalize_ref("e1"), "@e1");
        assert_eq!(normalize_ref("@e1"), "@e1");
        assert_eq!(normalize_ref(" e7 "), "@e7");
    }

    #[tokio::test]
    async fn test_click_uses_prefixed_ref() {
        let driver = Arc::new(RecordingDriver::default());
        let browser = Browser::with_driver(config(), driver.clone());

        browser.click("e3").await.unwrap();

        let commands = driver.commands.lock().unwrap();
        assert_eq!(commands[0], "click @e3");
        assert_eq!(commands[1], "snapshot -i --json");
    }

    #[tokio::test]
    async fn test_commands_fail_after_close() {
        let driver = Arc::new(RecordingDriver::default());
        let browser = Browser::with_driver(config(), driver.clone());

        browser.close().await;
        assert!(browser.is_closed());

        let err = browser.open("https://example.com").await.unwrap_err();
        assert!(matches!(err, OperatorError::SessionClosed(_)));
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_survives_driver_failure() {
        let driver = Arc::new(RecordingDriver {
            fail_close: true,
            ..Default::default()
        });
        let browser = Browser::with_driver(config(), driver.clone());

        browser.close().await;
        browser.close().await;

        assert!(browser.is_closed());
        assert_eq!(driver.commands.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_close_detached_marks_closed_and_shuts_down() {
        let driver = Arc::new(RecordingDriver::default());
        let browser = Browser::with_driver(config(), driver.clone());

        browser.close_detached();
        assert!(browser.is_closed());

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        browser.close().await;
        assert_eq!(*driver.commands.lock().unwrap(), vec!["close".to_string()]);
    }
}
